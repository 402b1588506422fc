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

//! Runs encoded raw commands through the vendor tool, one at a time.
//!
//! Each invocation blocks until the child exits. There is no timeout and no
//! retry: a hung tool hangs the caller, and a failed command is recorded once.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::json;

use crate::command_log::{CommandLog, ExecutionResult, Failure, Outcome};
use crate::encoder::RawCommand;
use crate::error::{FanError, Result};
use crate::logger;

/// What the vendor tool left behind once it exited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// `None` when the child was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Process seam so dispatch can be exercised without a BMC.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner {
    /// Run `program` with `args` to completion. `Err` means it never started.
    fn run(&self, program: &Path, args: &[String]) -> io::Result<ToolOutput>;
}

/// Spawns the real tool with arguments passed directly, no shell in between.
#[derive(Debug, Default, Clone, Copy)]
pub struct ToolRunner;

impl CommandRunner for ToolRunner {
    fn run(&self, program: &Path, args: &[String]) -> io::Result<ToolOutput> {
        let output = Command::new(program).args(args).output()?;
        Ok(ToolOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Confirms the tool is present. Called once at startup; a miss is fatal.
pub fn locate_tool(path: &Path) -> Result<PathBuf> {
    if path.is_file() {
        Ok(path.to_path_buf())
    } else {
        Err(FanError::ToolMissing(path.to_path_buf()))
    }
}

pub fn classify(result: io::Result<ToolOutput>) -> Outcome {
    match result {
        Ok(out) if out.success() => Outcome::Success,
        Ok(out) => Outcome::Failure(Failure::Exit {
            code: out.code,
            stderr: out.stderr,
        }),
        Err(e) => Outcome::Failure(Failure::Spawn { reason: e.to_string() }),
    }
}

/// Log event for a finished command. The tool's stdout is kept here only;
/// the audit log shows stderr.
fn result_event(entry: &ExecutionResult, stdout: &str) -> serde_json::Value {
    let mut event = entry.to_json();
    event["stdout"] = json!(stdout);
    event
}

pub struct Dispatcher<R: CommandRunner = ToolRunner> {
    tool: PathBuf,
    runner: R,
}

impl Dispatcher<ToolRunner> {
    pub fn new(tool: PathBuf) -> Self {
        Self { tool, runner: ToolRunner }
    }
}

impl<R: CommandRunner> Dispatcher<R> {
    pub fn with_runner(tool: PathBuf, runner: R) -> Self {
        Self { tool, runner }
    }

    /// Run one command and append its outcome to `log`.
    fn run_one(&self, command: &RawCommand, log: &mut CommandLog) -> ExecutionResult {
        let text = command.command_line(&self.tool);
        logger::log_event("dispatch", json!({ "command": text }));

        let output = self.runner.run(&self.tool, &command.args());
        let stdout = output.as_ref().map(|o| o.stdout.trim().to_string()).unwrap_or_default();
        let entry = log.record(text, classify(output)).clone();

        logger::log_event("dispatch_result", result_event(&entry, &stdout));
        entry
    }

    /// Run `commands` strictly in order. Command N+1 starts only after the
    /// outcome of command N is in the log. A failure does not stop the batch.
    pub fn dispatch(&self, commands: &[RawCommand], log: &mut CommandLog) -> Vec<ExecutionResult> {
        commands.iter().map(|cmd| self.run_one(cmd, log)).collect()
    }
}
