//! Editor-management commands.
//!
//! - Registry: every action/sub-action with a description (registry.rs)
//! - Parsing: command-line tokens and completion (parse.rs)
//! - Resolution: validated request to editor command (resolve.rs)
//! - Execution: launching the editor and normalizing results (exec/)
//!
//! Commands follow an `action [sub-action] [target]` pattern, e.g.
//! `plugins install telescope.nvim` or `lsp uninstall lua_ls`.

mod exec;
mod parse;
mod registry;
mod resolve;

pub use exec::{normalize, Dispatcher, ExecutionResult, Status};
pub use parse::{complete_command_input, parse_tokens, CommandError, CommandParseResult};
pub use registry::{command_help_lines, find_command, CommandSpec, COMMANDS, TOP_LEVEL_COMMANDS};
pub use resolve::{resolve, EditorCommand, FormatCommand, LspCommand, PluginsCommand};
