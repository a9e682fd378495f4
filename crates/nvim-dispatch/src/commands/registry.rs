//! Command registry and metadata.
//!
//! Lists every action/sub-action pair with a description and the kind
//! of target it takes. Used for help output and completion; the actual
//! mapping to editor commands lives in `resolve.rs`.

/// Specification for a single action/sub-action pair.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// Placeholder shown in help when the pair needs a target.
    pub target: Option<&'static str>,
}

/// Top-level action names (first word of a command line).
pub const TOP_LEVEL_COMMANDS: &[&str] = &["health", "plugins", "format", "lsp"];

/// Full command specifications with descriptions.
pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "health",
        description: "Run the built-in health diagnostics",
        target: None,
    },
    CommandSpec {
        name: "plugins status",
        description: "Show the plugin manager status view (default)",
        target: None,
    },
    CommandSpec {
        name: "plugins update",
        description: "Update all plugins",
        target: None,
    },
    CommandSpec {
        name: "plugins clean",
        description: "Remove plugins that are no longer declared",
        target: None,
    },
    CommandSpec {
        name: "plugins install",
        description: "Install a plugin by name",
        target: Some("<plugin>"),
    },
    CommandSpec {
        name: "format check",
        description: "Show the formatter configuration (default)",
        target: None,
    },
    CommandSpec {
        name: "format run",
        description: "Show formatter info for a file",
        target: Some("<path>"),
    },
    CommandSpec {
        name: "lsp info",
        description: "Show the language-server manager view (default)",
        target: None,
    },
    CommandSpec {
        name: "lsp install",
        description: "Install a language server by name",
        target: Some("<server>"),
    },
    CommandSpec {
        name: "lsp uninstall",
        description: "Uninstall a language server by name",
        target: Some("<server>"),
    },
];

fn usage(command: &CommandSpec) -> String {
    match command.target {
        Some(target) => format!("{} {target}", command.name),
        None => command.name.to_string(),
    }
}

/// Generate help lines for all commands, aligned on the description.
pub fn command_help_lines() -> Vec<String> {
    let usages: Vec<String> = COMMANDS.iter().map(usage).collect();
    let longest = usages.iter().map(String::len).max().unwrap_or(0);
    usages
        .iter()
        .zip(COMMANDS)
        .map(|(usage, command)| {
            format!("{:<width$}  {}", usage, command.description, width = longest)
        })
        .collect()
}

/// Look up the spec for an `action sub-action` name.
pub fn find_command(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|command| command.name == name)
}
