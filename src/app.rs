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

use crate::command_log::ExecutionResult;
use crate::config::DEFAULT_SLIDER_STEP;
use crate::controller::{Controller, FanAction};
use crate::dispatch::{CommandRunner, ToolRunner};
use crate::encoder::{FanChannel, PresetMode};
use crate::i18n::{tr, Language, TextKey};

pub const VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));

const HELP: &str = "1/2/3: presets | Tab: focus | ←/→: drag | Enter/Space: release | r: reset | l: language | q: quit";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Focus {
    Presets,
    CpuSlider,
    PeripheralSlider,
    Reset,
}

impl Focus {
    const ORDER: [Focus; 4] = [Focus::Presets, Focus::CpuSlider, Focus::PeripheralSlider, Focus::Reset];

    pub fn next(self) -> Focus {
        let i = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(i + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Focus {
        let i = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(i + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    pub fn channel(self) -> Option<FanChannel> {
        match self {
            Focus::CpuSlider => Some(FanChannel::Cpu),
            Focus::PeripheralSlider => Some(FanChannel::Peripheral),
            _ => None,
        }
    }
}

pub struct App<R: CommandRunner = ToolRunner> {
    pub controller: Controller<R>,
    pub language: Language,
    pub focus: Focus,
    pub preset_idx: usize,
    // slider knob positions; only committed on release
    pub cpu_slider: u8,
    pub peripheral_slider: u8,
    pub slider_step: u8,
    pub status: String,
    pub show_language_menu: bool,
    pub language_idx: usize,
    pub show_warning_popup: bool,
    pub warning_message: String,
    // header
    pub board_name: String,
    pub privileged: bool,
}

impl<R: CommandRunner> App<R> {
    pub fn new(controller: Controller<R>, language: Language) -> Self {
        let mirror = controller.mirror();
        Self {
            controller,
            language,
            focus: Focus::Presets,
            preset_idx: 0,
            cpu_slider: mirror.percent(FanChannel::Cpu),
            peripheral_slider: mirror.percent(FanChannel::Peripheral),
            slider_step: DEFAULT_SLIDER_STEP,
            status: HELP.to_string(),
            show_language_menu: false,
            language_idx: 0,
            show_warning_popup: false,
            warning_message: String::new(),
            board_name: String::new(),
            privileged: true,
        }
    }

    pub fn text(&self, key: TextKey) -> &'static str {
        tr(self.language, key)
    }

    pub fn slider(&self, channel: FanChannel) -> u8 {
        match channel {
            FanChannel::Cpu => self.cpu_slider,
            FanChannel::Peripheral => self.peripheral_slider,
        }
    }

    fn slider_mut(&mut self, channel: FanChannel) -> &mut u8 {
        match channel {
            FanChannel::Cpu => &mut self.cpu_slider,
            FanChannel::Peripheral => &mut self.peripheral_slider,
        }
    }

    /// Move the knob without committing anything.
    pub fn drag(&mut self, channel: FanChannel, delta: i16) {
        let slot = self.slider_mut(channel);
        *slot = (i16::from(*slot) + delta).clamp(0, 100) as u8;
    }

    pub fn release(&mut self, channel: FanChannel) {
        let percent = i64::from(self.slider(channel));
        self.perform(FanAction::SliderReleased { channel, percent }, channel.label());
    }

    pub fn apply_preset(&mut self, mode: PresetMode) {
        let label = self.text(preset_key(mode));
        self.perform(FanAction::Preset(mode), label);
    }

    pub fn reset(&mut self) {
        let label = self.text(TextKey::ResetAuto);
        self.perform(FanAction::Reset, label);
    }

    fn perform(&mut self, action: FanAction, label: &str) {
        match self.controller.handle(action) {
            Ok(results) => self.status = summarize(label, &results),
            Err(e) => self.show_warning(e.to_string()),
        }
        self.sync_sliders();
    }

    /// Snap both knobs to what the controller last confirmed.
    pub fn sync_sliders(&mut self) {
        let mirror = self.controller.mirror();
        self.cpu_slider = mirror.percent(FanChannel::Cpu);
        self.peripheral_slider = mirror.percent(FanChannel::Peripheral);
    }

    pub fn show_warning(&mut self, message: String) {
        self.warning_message = message;
        self.show_warning_popup = true;
    }

    pub fn open_language_menu(&mut self) {
        self.language_idx = Language::ALL.iter().position(|l| *l == self.language).unwrap_or(0);
        self.show_language_menu = true;
    }

    pub fn change_language(&mut self, language: Language) {
        self.language = language;
        self.show_language_menu = false;
    }

    pub fn focused_preset(&self) -> PresetMode {
        PresetMode::ALL[self.preset_idx.min(PresetMode::ALL.len() - 1)]
    }

    pub fn activate_focused(&mut self) {
        match self.focus {
            Focus::Presets => self.apply_preset(self.focused_preset()),
            Focus::CpuSlider => self.release(FanChannel::Cpu),
            Focus::PeripheralSlider => self.release(FanChannel::Peripheral),
            Focus::Reset => self.reset(),
        }
    }
}

pub fn preset_key(mode: PresetMode) -> TextKey {
    match mode {
        PresetMode::Silent => TextKey::SilentMode,
        PresetMode::Performance => TextKey::PerformanceMode,
        PresetMode::FullSpeed => TextKey::FullSpeedMode,
    }
}

fn summarize(label: &str, results: &[ExecutionResult]) -> String {
    if results.is_empty() {
        return format!("{}: unchanged, nothing sent", label);
    }
    let ok = results.iter().filter(|r| r.outcome.is_success()).count();
    format!("{}: {}/{} command(s) succeeded", label, ok, results.len())
}
