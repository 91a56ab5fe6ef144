// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Report action that runs an external program.

use tokio::process::Command;

use crate::error::ActionError;
use crate::types::TriggerKind;

use super::ReportAction;

/// Runs `<program> [args...] <kind>` and returns its standard output.
///
/// # Examples
///
/// ```
/// use carwatch::action::CommandReportAction;
///
/// let action = CommandReportAction::new("carwatch-report").with_arg("--send");
/// assert_eq!(action.program(), "carwatch-report");
/// ```
#[derive(Debug, Clone)]
pub struct CommandReportAction {
    program: String,
    args: Vec<String>,
}

impl CommandReportAction {
    /// Creates an action running `program`.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Parses a shell-like command line split on whitespace.
    ///
    /// Returns `None` if the line is blank.
    #[must_use]
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let program = parts.next()?;
        Some(Self {
            program: program.to_string(),
            args: parts.map(str::to_string).collect(),
        })
    }

    /// Appends a fixed argument placed before the report kind.
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Returns the program name.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl ReportAction for CommandReportAction {
    async fn run(&self, kind: TriggerKind) -> Result<String, ActionError> {
        tracing::debug!(program = %self.program, %kind, "Running report command");

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(kind.as_str())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(ActionError::NonZeroExit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn parses_command_line() {
        let action = CommandReportAction::from_command_line("  report  --chart  --send ").unwrap();
        assert_eq!(action.program(), "report");
        assert_eq!(action.args, vec!["--chart", "--send"]);
    }

    #[test]
    fn blank_command_line_is_none() {
        assert!(CommandReportAction::from_command_line("   ").is_none());
    }

    #[tokio::test]
    async fn passes_kind_as_last_argument() {
        let action = CommandReportAction::new("echo").with_arg("report");
        let output = action.run(TriggerKind::Charge).await.unwrap();
        assert_eq!(output, "report charge");
    }

    #[tokio::test]
    async fn non_zero_exit_is_an_error() {
        let action = CommandReportAction::new("false");
        let err = action.run(TriggerKind::Drive).await.unwrap_err();
        assert!(matches!(err, ActionError::NonZeroExit { code: Some(1), .. }));
    }

    #[tokio::test]
    async fn missing_program_is_io_error() {
        let action = CommandReportAction::new("/nonexistent/carwatch-report");
        let err = action.run(TriggerKind::Drive).await.unwrap_err();
        assert!(matches!(err, ActionError::Io(_)));
    }
}
