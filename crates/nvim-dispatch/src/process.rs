//! Headless editor execution.
//!
//! The editor is started once per request with the resolved command
//! followed by a forced quit, so it exits whatever the command does:
//!
//! ```text
//! nvim [extra args] --headless -c "<command>" -c "qa!"
//! ```
//!
//! Launching goes through the `ProcessRunner` trait so callers (and
//! tests) can swap in something that never touches a real process.

use std::io;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::EditorConfig;

/// Ex command appended after every request so the editor always exits.
pub const FORCE_QUIT: &str = "qa!";

/// A fully resolved process launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl Invocation {
    /// Build the headless invocation for one editor command.
    pub fn headless(editor: &EditorConfig, command: &str) -> Self {
        let mut args = editor.args.clone();
        args.extend([
            "--headless".to_string(),
            "-c".to_string(),
            command.to_string(),
            "-c".to_string(),
            FORCE_QUIT.to_string(),
        ]);
        Self {
            program: editor.command.clone(),
            args,
            cwd: editor.root.clone(),
        }
    }

    /// Shell-style rendering, for dry runs and logs.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(shell_quote)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn shell_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || "-_./=:+,@".contains(ch));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', "'\\''"))
    }
}

/// Captured outcome of a process that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    pub ok: bool,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Capability to execute an invocation and capture its output.
///
/// `Err` means the process could not be started at all.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> io::Result<ExecResult>;
}

/// Runs invocations as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessRunner;

#[async_trait]
impl ProcessRunner for HeadlessRunner {
    async fn run(&self, invocation: &Invocation) -> io::Result<ExecResult> {
        tracing::debug!(
            program = %invocation.program,
            args = ?invocation.args,
            cwd = %invocation.cwd.display(),
            "launching editor"
        );
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;
        let result = ExecResult {
            ok: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };
        tracing::debug!(ok = result.ok, exit_code = ?result.exit_code, "editor exited");
        Ok(result)
    }
}
