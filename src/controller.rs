/*
 * This file is part of Fanlord.
 *
 * Copyright (C) 2025 Fanlord contributors
 *
 * Fanlord is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Fanlord is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Fanlord. If not, see <https://www.gnu.org/licenses/>.
 */

//! Single owner of the command log and the displayed fan state.
//!
//! The front end calls one method per user action and renders whatever the
//! controller exposes afterwards. Nothing here reads back from the BMC, so
//! the mirror is "last value the tool accepted", not measured truth.

use crate::command_log::{CommandLog, ExecutionResult};
use crate::dispatch::{CommandRunner, Dispatcher, ToolRunner};
use crate::encoder::{
    encode_duty_cycle, encode_preset, encode_reset, CommandEffect, DutyCycle, FanChannel, PresetMode,
    RawCommand,
};
use crate::error::{FanError, Result};

/// Last successfully commanded duty per channel. `None` means the BMC's
/// automatic control owns that channel (at startup and after a reset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MirrorState {
    pub cpu: Option<DutyCycle>,
    pub peripheral: Option<DutyCycle>,
}

impl MirrorState {
    pub fn get(&self, channel: FanChannel) -> Option<DutyCycle> {
        match channel {
            FanChannel::Cpu => self.cpu,
            FanChannel::Peripheral => self.peripheral,
        }
    }

    pub fn is_automatic(&self, channel: FanChannel) -> bool {
        self.get(channel).is_none()
    }

    /// Slider position for the channel; automatic channels sit at 0.
    pub fn percent(&self, channel: FanChannel) -> u8 {
        self.get(channel).map_or(0, DutyCycle::percent)
    }

    fn apply(&mut self, effect: CommandEffect) {
        match effect {
            CommandEffect::SetDuty { channel: FanChannel::Cpu, duty } => self.cpu = Some(duty),
            CommandEffect::SetDuty { channel: FanChannel::Peripheral, duty } => self.peripheral = Some(duty),
            CommandEffect::ResumeAutomatic => *self = MirrorState::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Encoding,
    Dispatching { total: usize },
}

/// A user action the front end can hand to [`Controller::handle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanAction {
    SliderReleased { channel: FanChannel, percent: i64 },
    Preset(PresetMode),
    Reset,
}

pub struct Controller<R: CommandRunner = ToolRunner> {
    dispatcher: Dispatcher<R>,
    log: CommandLog,
    mirror: MirrorState,
    phase: Phase,
}

impl<R: CommandRunner> Controller<R> {
    pub fn new(dispatcher: Dispatcher<R>) -> Self {
        Self {
            dispatcher,
            log: CommandLog::new(),
            mirror: MirrorState::default(),
            phase: Phase::Idle,
        }
    }

    pub fn log(&self) -> &CommandLog {
        &self.log
    }

    pub fn mirror(&self) -> MirrorState {
        self.mirror
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn handle(&mut self, action: FanAction) -> Result<Vec<ExecutionResult>> {
        match action {
            FanAction::SliderReleased { channel, percent } => self.on_slider_release(channel, percent),
            FanAction::Preset(mode) => self.apply_preset(mode),
            FanAction::Reset => self.reset_to_auto(),
        }
    }

    /// Commit a released slider. A release at the duty this channel was
    /// last set to dispatches nothing and returns an empty list. A channel
    /// under automatic control always dispatches.
    pub fn on_slider_release(&mut self, channel: FanChannel, percent: i64) -> Result<Vec<ExecutionResult>> {
        if let Some(current) = self.mirror.get(channel) {
            if i64::from(current.percent()) == percent {
                return Ok(Vec::new());
            }
        }
        self.set_duty(channel, percent)
    }

    /// Write one channel unconditionally.
    pub fn set_duty(&mut self, channel: FanChannel, percent: i64) -> Result<Vec<ExecutionResult>> {
        self.run(|| encode_duty_cycle(channel, percent).map(|c| vec![c]))
    }

    pub fn apply_preset(&mut self, mode: PresetMode) -> Result<Vec<ExecutionResult>> {
        self.run(|| Ok(encode_preset(mode)))
    }

    pub fn reset_to_auto(&mut self) -> Result<Vec<ExecutionResult>> {
        self.run(|| Ok(vec![encode_reset()]))
    }

    fn run<F>(&mut self, encode: F) -> Result<Vec<ExecutionResult>>
    where
        F: FnOnce() -> Result<Vec<RawCommand>>,
    {
        if self.phase != Phase::Idle {
            return Err(FanError::Busy);
        }
        self.phase = Phase::Encoding;
        let commands = match encode() {
            Ok(c) => c,
            Err(e) => {
                self.phase = Phase::Idle;
                return Err(e);
            }
        };

        self.phase = Phase::Dispatching { total: commands.len() };
        let results = self.dispatcher.dispatch(&commands, &mut self.log);
        for (command, result) in commands.iter().zip(&results) {
            if result.outcome.is_success() {
                self.mirror.apply(command.effect());
            }
        }
        self.phase = Phase::Idle;
        Ok(results)
    }
}
