//! Mapping from validated requests to editor commands.
//!
//! Each action owns its own sub-command enum, so adding a row means
//! adding a variant and the compiler points at every match that needs
//! updating. Unrecognized sub-actions resolve to the action's default
//! variant; `health` has a single behavior and ignores both sub-action
//! and target.

use crate::error::{DispatchError, Result};
use crate::request::{Action, Request};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorCommand {
    Health,
    Plugins(PluginsCommand),
    Format(FormatCommand),
    Lsp(LspCommand),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginsCommand {
    Status,
    Update,
    Clean,
    Install(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatCommand {
    Info,
    Run(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LspCommand {
    Info,
    Install(String),
    Uninstall(String),
}

/// Resolve a validated request to exactly one editor command.
///
/// Fails with `MissingTarget` when the selected row needs a target and
/// none (or only whitespace) was supplied.
pub fn resolve(request: &Request) -> Result<EditorCommand> {
    let sub_action = request.sub_action.as_deref();
    let target = request.target.as_deref();
    let command = match request.action {
        Action::Health => EditorCommand::Health,
        Action::Plugins => EditorCommand::Plugins(match sub_action {
            Some("update") => PluginsCommand::Update,
            Some("clean") => PluginsCommand::Clean,
            Some("install") => {
                PluginsCommand::Install(require_target(Action::Plugins, "install", target)?)
            }
            Some("status") | Some(_) | None => PluginsCommand::Status,
        }),
        Action::Format => EditorCommand::Format(match sub_action {
            Some("run") => FormatCommand::Run(require_target(Action::Format, "run", target)?),
            Some("check") | Some(_) | None => FormatCommand::Info,
        }),
        Action::Lsp => EditorCommand::Lsp(match sub_action {
            Some("install") => LspCommand::Install(require_target(Action::Lsp, "install", target)?),
            Some("uninstall") => {
                LspCommand::Uninstall(require_target(Action::Lsp, "uninstall", target)?)
            }
            Some("info") | Some(_) | None => LspCommand::Info,
        }),
    };
    Ok(command)
}

fn require_target(
    action: Action,
    sub_action: &'static str,
    target: Option<&str>,
) -> Result<String> {
    let Some(target) = target.filter(|value| !value.trim().is_empty()) else {
        return Err(DispatchError::MissingTarget {
            action: action.as_str(),
            sub_action,
        });
    };
    if let Some(ch) = target.chars().find(|ch| ch.is_control()) {
        return Err(DispatchError::InvalidTarget(format!(
            "control character {:?} is not allowed",
            ch
        )));
    }
    Ok(target.to_string())
}

impl EditorCommand {
    /// The Ex command line handed to the editor.
    pub fn command_line(&self) -> String {
        match self {
            EditorCommand::Health => "checkhealth".to_string(),
            EditorCommand::Plugins(PluginsCommand::Status) => "Lazy".to_string(),
            EditorCommand::Plugins(PluginsCommand::Update) => "Lazy update".to_string(),
            EditorCommand::Plugins(PluginsCommand::Clean) => "Lazy clean".to_string(),
            EditorCommand::Plugins(PluginsCommand::Install(name)) => {
                format!("Lazy install {}", escape_ex_arg(name))
            }
            EditorCommand::Format(FormatCommand::Info) => "ConformInfo".to_string(),
            EditorCommand::Format(FormatCommand::Run(path)) => format!(
                "execute 'edit ' .. fnameescape({}) | ConformInfo",
                vim_string(path)
            ),
            EditorCommand::Lsp(LspCommand::Info) => "Mason".to_string(),
            EditorCommand::Lsp(LspCommand::Install(name)) => {
                format!("MasonInstall {}", escape_ex_arg(name))
            }
            EditorCommand::Lsp(LspCommand::Uninstall(name)) => {
                format!("MasonUninstall {}", escape_ex_arg(name))
            }
        }
    }

    /// Canonical `action sub-action` name, matching the registry.
    pub fn name(&self) -> &'static str {
        match self {
            EditorCommand::Health => "health",
            EditorCommand::Plugins(PluginsCommand::Status) => "plugins status",
            EditorCommand::Plugins(PluginsCommand::Update) => "plugins update",
            EditorCommand::Plugins(PluginsCommand::Clean) => "plugins clean",
            EditorCommand::Plugins(PluginsCommand::Install(_)) => "plugins install",
            EditorCommand::Format(FormatCommand::Info) => "format check",
            EditorCommand::Format(FormatCommand::Run(_)) => "format run",
            EditorCommand::Lsp(LspCommand::Info) => "lsp info",
            EditorCommand::Lsp(LspCommand::Install(_)) => "lsp install",
            EditorCommand::Lsp(LspCommand::Uninstall(_)) => "lsp uninstall",
        }
    }
}

/// Backslash-escape characters that Ex command-line parsing treats
/// specially in user-command arguments (separators, command bar,
/// comment). Anything else passes through untouched.
///
/// Not enough for file arguments: `:edit` also expands backticks,
/// `$VAR`, wildcards and a leading `+cmd`. Those go through `vim_string`.
fn escape_ex_arg(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | ' ' | '|' | '"' | '%' | '#') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Single-quoted Vim string literal; only `'` is special inside it.
fn vim_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
