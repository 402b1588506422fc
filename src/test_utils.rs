/*
 * Test utilities and mock helpers for Fanlord
 *
 * Shared fixtures for the unit tests: canned tool outputs and mocked
 * runners. Real child processes are covered in tests/integration_tests.rs.
 */

use crate::app::App;
use crate::controller::Controller;
use crate::dispatch::{Dispatcher, MockCommandRunner, ToolOutput};
use crate::i18n::Language;
use std::io;
use std::path::PathBuf;

pub const FAKE_TOOL: &str = "IPMICFG-Linux.x86_64";

/// Output of a tool that exited with `code`.
pub fn tool_exit(code: i32, stderr: &str) -> io::Result<ToolOutput> {
    Ok(ToolOutput { code: Some(code), stdout: String::new(), stderr: stderr.to_string() })
}

/// A runner that answers every invocation with the same exit code.
pub fn mock_runner(code: i32, stderr: &'static str) -> MockCommandRunner {
    let mut runner = MockCommandRunner::new();
    runner.expect_run().returning(move |_, _| tool_exit(code, stderr));
    runner
}

pub fn mock_controller(runner: MockCommandRunner) -> Controller<MockCommandRunner> {
    Controller::new(Dispatcher::with_runner(PathBuf::from(FAKE_TOOL), runner))
}

/// English app whose tool always exits with `code`.
pub fn mock_app(code: i32) -> App<MockCommandRunner> {
    App::new(mock_controller(mock_runner(code, "Invalid data field in request")), Language::English)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_app_fails_every_command() {
        let mut app = mock_app(1);
        app.apply_preset(crate::encoder::PresetMode::Silent);
        assert_eq!(app.controller.log().failure_count(), 2);
    }
}
