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

//! Raw-command encoding for Supermicro X-series fan zones.
//!
//! Everything here is pure: the same target always yields the same bytes,
//! and nothing touches a process, file or socket.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FanError, Result};

/// OEM "set fan zone duty" prefix: netfn 0x30, cmd 0x70, sub 0x66, write 0x01.
pub const SET_DUTY_PREFIX: [u8; 4] = [0x30, 0x70, 0x66, 0x01];

/// OEM "set fan mode" with mode 0x01, which hands control back to the BMC.
pub const RESET_AUTO_SEQUENCE: [u8; 4] = [0x30, 0x45, 0x01, 0x01];

/// Below this duty the BMC may decide the fans are failing and go to full
/// speed. Advisory only; the encoder never clamps.
pub const LOW_DUTY_THRESHOLD: u8 = 30;

/// Sub-command word that puts the vendor tool into raw mode.
pub const RAW_FLAG: &str = "-raw";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanChannel {
    Cpu,
    Peripheral,
}

impl FanChannel {
    /// Fixed order used whenever more than one channel is written.
    pub const ALL: [FanChannel; 2] = [FanChannel::Cpu, FanChannel::Peripheral];

    /// Zone byte the BMC expects. Never swap these.
    pub fn zone(self) -> u8 {
        match self {
            FanChannel::Cpu => 0x00,
            FanChannel::Peripheral => 0x01,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FanChannel::Cpu => "CPU",
            FanChannel::Peripheral => "Peripheral",
        }
    }
}

impl fmt::Display for FanChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whole-percent fan duty, always within 0..=100.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DutyCycle(u8);

impl DutyCycle {
    pub const MIN: DutyCycle = DutyCycle(0);
    pub const MAX: DutyCycle = DutyCycle(100);

    pub fn new(percent: i64) -> Result<Self> {
        if (0..=100).contains(&percent) {
            Ok(DutyCycle(percent as u8))
        } else {
            Err(FanError::OutOfRange { value: percent })
        }
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    /// Two lowercase hex digits, zero padded: 40 -> "28", 100 -> "64".
    pub fn hex(self) -> String {
        format!("{:02x}", self.0)
    }

    pub fn is_below_threshold(self) -> bool {
        self.0 < LOW_DUTY_THRESHOLD
    }
}

impl fmt::Display for DutyCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PresetMode {
    Silent,
    Performance,
    FullSpeed,
}

impl PresetMode {
    pub const ALL: [PresetMode; 3] = [PresetMode::Silent, PresetMode::Performance, PresetMode::FullSpeed];

    /// Per-channel duties, CPU first.
    pub fn targets(self) -> [(FanChannel, DutyCycle); 2] {
        let (cpu, peripheral) = match self {
            PresetMode::Silent => (40, 40),
            PresetMode::Performance => (50, 100),
            PresetMode::FullSpeed => (100, 100),
        };
        [
            (FanChannel::Cpu, DutyCycle(cpu)),
            (FanChannel::Peripheral, DutyCycle(peripheral)),
        ]
    }
}

/// What a raw command does to the fans, used to update the mirror on success.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CommandEffect {
    SetDuty { channel: FanChannel, duty: DutyCycle },
    ResumeAutomatic,
}

/// One BMC raw-command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommand {
    bytes: Vec<u8>,
    effect: CommandEffect,
}

impl RawCommand {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn effect(&self) -> CommandEffect {
        self.effect
    }

    /// Byte tokens as the tool expects them, e.g. `["0x30", "0x70", ...]`.
    pub fn hex_tokens(&self) -> Vec<String> {
        self.bytes.iter().map(|b| format!("0x{:02x}", b)).collect()
    }

    /// Full argument vector for the vendor tool, `-raw` included.
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.bytes.len() + 1);
        args.push(RAW_FLAG.to_string());
        args.extend(self.hex_tokens());
        args
    }

    /// The literal invocation as shown in the audit log.
    pub fn command_line(&self, tool: &Path) -> String {
        format!("\"{}\" {}", tool.display(), self.args().join(" "))
    }
}

impl fmt::Display for RawCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.args().join(" "))
    }
}

fn set_duty(channel: FanChannel, duty: DutyCycle) -> RawCommand {
    let mut bytes = SET_DUTY_PREFIX.to_vec();
    bytes.push(channel.zone());
    bytes.push(duty.percent());
    RawCommand {
        bytes,
        effect: CommandEffect::SetDuty { channel, duty },
    }
}

/// Encode a single duty write. Fails before anything can be spawned when
/// `percent` is outside 0..=100. Values under 30 are encoded as given.
pub fn encode_duty_cycle(channel: FanChannel, percent: i64) -> Result<RawCommand> {
    let duty = DutyCycle::new(percent)?;
    Ok(set_duty(channel, duty))
}

pub fn encode_preset(mode: PresetMode) -> Vec<RawCommand> {
    mode.targets()
        .iter()
        .map(|&(channel, duty)| set_duty(channel, duty))
        .collect()
}

pub fn encode_reset() -> RawCommand {
    RawCommand {
        bytes: RESET_AUTO_SEQUENCE.to_vec(),
        effect: CommandEffect::ResumeAutomatic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn duty_byte(cmd: &RawCommand) -> String {
        cmd.hex_tokens().last().cloned().unwrap_or_default()
    }

    #[test]
    fn test_channel_zones_are_fixed() {
        assert_eq!(FanChannel::Cpu.zone(), 0x00);
        assert_eq!(FanChannel::Peripheral.zone(), 0x01);
        assert_eq!(FanChannel::ALL, [FanChannel::Cpu, FanChannel::Peripheral]);
    }

    #[test]
    fn test_known_duty_encodings() {
        assert_eq!(duty_byte(&encode_duty_cycle(FanChannel::Cpu, 40).unwrap()), "0x28");
        assert_eq!(duty_byte(&encode_duty_cycle(FanChannel::Peripheral, 100).unwrap()), "0x64");
        assert_eq!(duty_byte(&encode_duty_cycle(FanChannel::Cpu, 0).unwrap()), "0x00");
        assert_eq!(DutyCycle::new(40).unwrap().hex(), "28");
        assert_eq!(DutyCycle::new(10).unwrap().hex(), "0a");
    }

    #[test]
    fn test_every_duty_roundtrips_and_prefix_is_invariant() {
        for channel in FanChannel::ALL {
            for pct in 0..=100i64 {
                let cmd = encode_duty_cycle(channel, pct).unwrap();
                let tokens = cmd.hex_tokens();
                assert_eq!(tokens.len(), 6);
                assert_eq!(&tokens[..4], &["0x30", "0x70", "0x66", "0x01"]);
                assert_eq!(tokens[4], format!("0x{:02x}", channel.zone()));
                let hex = DutyCycle::new(pct).unwrap().hex();
                assert_eq!(hex.len(), 2);
                assert_eq!(i64::from_str_radix(&hex, 16).unwrap(), pct);
            }
        }
    }

    #[test]
    fn test_out_of_range_rejected() {
        for bad in [150, -5, 101, -1] {
            match encode_duty_cycle(FanChannel::Cpu, bad) {
                Err(FanError::OutOfRange { value }) => assert_eq!(value, bad),
                other => panic!("expected OutOfRange, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_low_duty_is_encoded_not_clamped() {
        let cmd = encode_duty_cycle(FanChannel::Peripheral, 10).unwrap();
        assert_eq!(duty_byte(&cmd), "0x0a");
        assert!(DutyCycle::new(10).unwrap().is_below_threshold());
        assert!(!DutyCycle::new(30).unwrap().is_below_threshold());
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let a = encode_duty_cycle(FanChannel::Cpu, 63).unwrap();
        let b = encode_duty_cycle(FanChannel::Cpu, 63).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.args(), b.args());
    }

    #[test]
    fn test_silent_preset() {
        let cmds = encode_preset(PresetMode::Silent);
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[0].effect(), CommandEffect::SetDuty { channel: FanChannel::Cpu, duty: DutyCycle(40) });
        assert_eq!(cmds[1].effect(), CommandEffect::SetDuty { channel: FanChannel::Peripheral, duty: DutyCycle(40) });
        assert_eq!(duty_byte(&cmds[0]), "0x28");
        assert_eq!(duty_byte(&cmds[1]), "0x28");
    }

    #[test]
    fn test_performance_preset() {
        let cmds = encode_preset(PresetMode::Performance);
        assert_eq!(cmds[0].to_string(), "-raw 0x30 0x70 0x66 0x01 0x00 0x32");
        assert_eq!(cmds[1].to_string(), "-raw 0x30 0x70 0x66 0x01 0x01 0x64");
    }

    #[test]
    fn test_full_speed_preset() {
        let cmds = encode_preset(PresetMode::FullSpeed);
        assert!(cmds.iter().all(|c| duty_byte(c) == "0x64"));
    }

    #[test]
    fn test_reset_sequence() {
        let cmd = encode_reset();
        assert_eq!(cmd.bytes(), &[0x30, 0x45, 0x01, 0x01]);
        assert_eq!(cmd.args(), vec!["-raw", "0x30", "0x45", "0x01", "0x01"]);
        assert_eq!(cmd.effect(), CommandEffect::ResumeAutomatic);
        assert_eq!(encode_reset(), cmd);
    }

    #[test]
    fn test_command_line_quotes_tool_path() {
        let cmd = encode_duty_cycle(FanChannel::Cpu, 40).unwrap();
        let line = cmd.command_line(&PathBuf::from("/opt/IPMICFG Linux/ipmicfg"));
        assert_eq!(line, "\"/opt/IPMICFG Linux/ipmicfg\" -raw 0x30 0x70 0x66 0x01 0x00 0x28");
    }

    #[test]
    fn test_preset_serde_names() {
        assert_eq!(serde_json::to_string(&PresetMode::FullSpeed).unwrap(), "\"full-speed\"");
        assert_eq!(serde_json::from_str::<FanChannel>("\"cpu\"").unwrap(), FanChannel::Cpu);
    }
}
