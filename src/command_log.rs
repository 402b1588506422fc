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

use chrono::{DateTime, Local, TimeDelta};
use serde_json::json;

use crate::error::FanError;
use crate::i18n::{tr, Language, TextKey};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// Tool exited non-zero; carries its stderr verbatim.
    Exit { code: Option<i32>, stderr: String },
    /// Tool could not be started.
    Spawn { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure(Failure),
}

/// Color tag for rendering.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LogTag {
    Success,
    Error,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    pub fn tag(&self) -> LogTag {
        match self {
            Outcome::Success => LogTag::Success,
            Outcome::Failure(_) => LogTag::Error,
        }
    }

    /// Diagnostic text for failures, empty for success.
    pub fn detail(&self) -> &str {
        match self {
            Outcome::Success => "",
            Outcome::Failure(Failure::Exit { stderr, .. }) => stderr,
            Outcome::Failure(Failure::Spawn { reason }) => reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub seq: u64,
    pub timestamp: DateTime<Local>,
    pub command: String,
    pub outcome: Outcome,
}

impl ExecutionResult {
    pub fn timestamp_label(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Rendered entry in the operator's language, matching the status panel:
    /// header line, verdict line, then any diagnostic text.
    pub fn render(&self, lang: Language) -> Vec<String> {
        let mut lines = vec![format!(
            "[{}] {}: {}",
            self.timestamp_label(),
            tr(lang, TextKey::ExecuteCommand),
            self.command
        )];
        match &self.outcome {
            Outcome::Success => lines.push(tr(lang, TextKey::CommandSuccess).to_string()),
            Outcome::Failure(failure) => {
                let key = match failure {
                    Failure::Exit { .. } => TextKey::CommandFailed,
                    Failure::Spawn { .. } => TextKey::CommandError,
                };
                lines.push(tr(lang, key).to_string());
                lines.extend(
                    self.outcome
                        .detail()
                        .lines()
                        .filter(|l| !l.trim().is_empty())
                        .map(str::to_string),
                );
            }
        }
        lines
    }

    pub fn to_error(&self) -> Option<FanError> {
        match &self.outcome {
            Outcome::Success => None,
            Outcome::Failure(Failure::Exit { code, stderr }) => Some(FanError::CommandExecution {
                command: self.command.clone(),
                code: *code,
                stderr: stderr.clone(),
            }),
            Outcome::Failure(Failure::Spawn { reason }) => Some(FanError::Spawn {
                command: self.command.clone(),
                reason: reason.clone(),
            }),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let (status, code) = match &self.outcome {
            Outcome::Success => ("success", Some(0)),
            Outcome::Failure(Failure::Exit { code, .. }) => ("failed", *code),
            Outcome::Failure(Failure::Spawn { .. }) => ("spawn_error", None),
        };
        json!({
            "seq": self.seq,
            "timestamp": self.timestamp.to_rfc3339(),
            "command": self.command,
            "status": status,
            "exit_code": code,
            "detail": self.outcome.detail(),
        })
    }
}

/// Append-only audit trail of every dispatched command.
#[derive(Debug, Default)]
pub struct CommandLog {
    entries: Vec<ExecutionResult>,
    next_seq: u64,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp and store an outcome. Every call adds exactly one entry, and
    /// each entry's timestamp is strictly later than the previous one.
    pub fn record(&mut self, command: String, outcome: Outcome) -> &ExecutionResult {
        let now = Local::now();
        let timestamp = match self.entries.last() {
            Some(prev) if now <= prev.timestamp => prev.timestamp + TimeDelta::microseconds(1),
            _ => now,
        };
        let entry = ExecutionResult {
            seq: self.next_seq,
            timestamp,
            command,
            outcome,
        };
        self.next_seq += 1;
        self.entries.push(entry);
        let last = self.entries.len() - 1;
        &self.entries[last]
    }

    pub fn entries(&self) -> &[ExecutionResult] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&ExecutionResult> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn failure_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.outcome.is_success()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exit_failure(stderr: &str) -> Outcome {
        Outcome::Failure(Failure::Exit { code: Some(1), stderr: stderr.to_string() })
    }

    #[test]
    fn test_record_appends_in_order() {
        let mut log = CommandLog::new();
        assert!(log.is_empty());
        log.record("a".to_string(), Outcome::Success);
        log.record("b".to_string(), exit_failure("nope"));
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].command, "a");
        assert_eq!(log.entries()[1].command, "b");
        assert_eq!(log.latest().map(|e| e.command.as_str()), Some("b"));
        assert_eq!(log.failure_count(), 1);
    }

    #[test]
    fn test_identical_commands_get_separate_entries() {
        let mut log = CommandLog::new();
        log.record("same".to_string(), Outcome::Success);
        log.record("same".to_string(), Outcome::Success);
        assert_eq!(log.len(), 2);
        let (a, b) = (&log.entries()[0], &log.entries()[1]);
        assert_ne!(a.seq, b.seq);
        assert!(a.timestamp < b.timestamp);
    }

    #[test]
    fn test_timestamps_strictly_increase_in_a_burst() {
        let mut log = CommandLog::new();
        for _ in 0..50 {
            log.record("0x30 0x45 0x01 0x01".to_string(), Outcome::Success);
        }
        assert!(log.entries().windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn test_tags() {
        assert_eq!(Outcome::Success.tag(), LogTag::Success);
        assert_eq!(exit_failure("x").tag(), LogTag::Error);
        assert_eq!(Outcome::Failure(Failure::Spawn { reason: "x".into() }).tag(), LogTag::Error);
    }

    #[test]
    fn test_render_success_english() {
        let mut log = CommandLog::new();
        let entry = log.record("\"ipmicfg\" -raw 0x30 0x45 0x01 0x01".to_string(), Outcome::Success).clone();
        let lines = entry.render(Language::English);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("Execute command: \"ipmicfg\" -raw 0x30 0x45 0x01 0x01"));
        assert_eq!(lines[1], "Command executed successfully!");
    }

    #[test]
    fn test_render_failure_includes_stderr() {
        let mut log = CommandLog::new();
        let entry = log.record("cmd".to_string(), exit_failure("Invalid data field\n")).clone();
        let lines = entry.render(Language::English);
        assert_eq!(lines[1], "Command execution failed:");
        assert_eq!(lines[2], "Invalid data field");
    }

    #[test]
    fn test_render_spawn_error() {
        let mut log = CommandLog::new();
        let outcome = Outcome::Failure(Failure::Spawn { reason: "permission denied".into() });
        let entry = log.record("cmd".to_string(), outcome).clone();
        let lines = entry.render(Language::English);
        assert_eq!(lines[1], "Error executing command:");
        assert_eq!(lines[2], "permission denied");
    }

    #[test]
    fn test_to_error() {
        let mut log = CommandLog::new();
        let ok = log.record("ok".to_string(), Outcome::Success).clone();
        assert!(ok.to_error().is_none());
        let bad = log.record("bad".to_string(), exit_failure("boom")).clone();
        assert!(matches!(bad.to_error(), Some(FanError::CommandExecution { code: Some(1), .. })));
    }

    #[test]
    fn test_to_json_fields() {
        let mut log = CommandLog::new();
        let entry = log.record("bad".to_string(), exit_failure("boom")).clone();
        let v = entry.to_json();
        assert_eq!(v["status"], "failed");
        assert_eq!(v["exit_code"], 1);
        assert_eq!(v["detail"], "boom");
        assert_eq!(v["seq"], 0);
    }
}
