//! Run Neovim management commands headless from structured requests.
//!
//! A request names an action (`health`, `plugins`, `format`, `lsp`), an
//! optional sub-action and an optional target. It is validated, mapped to
//! one Ex command, and run as
//! `nvim --headless -c <command> -c qa!` in the configured root.

pub mod commands;
pub mod config;
pub mod error;
pub mod process;
pub mod request;

#[cfg(test)]
mod test_utils;

pub use commands::{Dispatcher, EditorCommand, ExecutionResult, Status};
pub use config::{load_config, load_config_with, Config, EditorConfig};
pub use error::DispatchError;
pub use process::{ExecResult, HeadlessRunner, Invocation, ProcessRunner};
pub use request::{validate_request, Action, Request};
