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

//! Error type shared by the encoder, dispatcher and configuration layer.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias using [`FanError`]
pub type Result<T> = std::result::Result<T, FanError>;

#[derive(Error, Debug)]
pub enum FanError {
    /// A duty cycle outside 0..=100 reached the encoder. Nothing is dispatched.
    #[error("duty cycle {value}% is out of range (must be 0-100)")]
    OutOfRange { value: i64 },

    /// The vendor tool is not at the resolved path. Fatal at startup.
    #[error("IPMI tool not found at: {}", .0.display())]
    ToolMissing(PathBuf),

    /// The tool ran and exited non-zero.
    #[error("command failed ({}): {command}: {stderr}", exit_label(.code))]
    CommandExecution {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The OS refused to start the tool at all.
    #[error("failed to start {command}: {reason}")]
    Spawn { command: String, reason: String },

    /// Re-entry guard for the dispatch phase. Callers holding `&mut Controller` never see it.
    #[error("another fan command is still being dispatched")]
    Busy,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {}", c),
        None => "terminated by signal".to_string(),
    }
}
