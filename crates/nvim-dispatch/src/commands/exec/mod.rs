//! Request dispatch and result normalization.
//!
//! `Dispatcher` ties the pieces together: validate the raw request,
//! resolve it to an editor command, launch the editor headless, and fold
//! whatever happened into an `ExecutionResult`. Contract errors
//! (`DispatchError`) are returned before anything is launched; a failing
//! editor process is a normal result with `Status::Error`.

#[cfg(test)]
mod tests;

use std::io;

use serde::Serialize;
use serde_json::Value;

use super::resolve::{resolve, EditorCommand};
use crate::config::EditorConfig;
use crate::error::Result;
use crate::process::{ExecResult, HeadlessRunner, Invocation, ProcessRunner};
use crate::request::{validate_request, Request};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Result of one dispatched request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    pub status: Status,
    pub output: String,
}

impl ExecutionResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            output: output.into(),
        }
    }

    pub fn error(output: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            output: output.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

pub struct Dispatcher<R = HeadlessRunner> {
    runner: R,
    editor: EditorConfig,
}

impl Dispatcher<HeadlessRunner> {
    pub fn headless(editor: EditorConfig) -> Self {
        Self::new(HeadlessRunner, editor)
    }
}

impl<R: ProcessRunner> Dispatcher<R> {
    pub fn new(runner: R, editor: EditorConfig) -> Self {
        Self { runner, editor }
    }

    pub fn editor(&self) -> &EditorConfig {
        &self.editor
    }

    /// Validate and resolve without launching anything.
    pub fn resolve(&self, raw: &Value) -> Result<EditorCommand> {
        let request = validate_request(raw)?;
        resolve(&request)
    }

    pub fn invocation(&self, command: &EditorCommand) -> Invocation {
        Invocation::headless(&self.editor, &command.command_line())
    }

    /// Single entry point: raw JSON request in, normalized result out.
    pub async fn dispatch(&self, raw: &Value) -> Result<ExecutionResult> {
        let request = validate_request(raw)?;
        self.dispatch_request(&request).await
    }

    pub async fn dispatch_request(&self, request: &Request) -> Result<ExecutionResult> {
        tracing::info!(
            action = %request.action,
            sub_action = request.sub_action.as_deref().unwrap_or(""),
            "dispatching request"
        );
        let command = resolve(request)?;
        let invocation = self.invocation(&command);
        tracing::debug!(
            command = command.name(),
            line = %command.command_line(),
            "resolved editor command"
        );

        let outcome = self.runner.run(&invocation).await;
        let result = normalize(&invocation.program, outcome);
        if !result.is_success() {
            tracing::warn!(command = command.name(), output = %result.output, "editor command failed");
        }
        Ok(result)
    }
}

/// Fold a process outcome into the caller-facing result.
///
/// Success carries stdout. Failure carries stderr, else stdout, else a
/// description of how the process ended.
pub fn normalize(program: &str, outcome: io::Result<ExecResult>) -> ExecutionResult {
    match outcome {
        Ok(result) if result.ok => ExecutionResult::success(result.stdout),
        Ok(result) => {
            if !result.stderr.trim().is_empty() {
                ExecutionResult::error(result.stderr)
            } else if !result.stdout.trim().is_empty() {
                ExecutionResult::error(result.stdout)
            } else {
                ExecutionResult::error(match result.exit_code {
                    Some(code) => format!("{program} exited with status {code}"),
                    None => format!("{program} was terminated by a signal"),
                })
            }
        }
        Err(err) => ExecutionResult::error(format!("failed to start {program}: {err}")),
    }
}
