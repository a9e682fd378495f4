//! Command-line parsing and completion.
//!
//! Turns `action [sub-action] [target]` tokens into a raw request object
//! (validation still happens in `request.rs`), and provides completion
//! for partially typed lines.

use serde_json::{Map, Value};

use super::registry::{COMMANDS, TOP_LEVEL_COMMANDS};

/// Parse error with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError {
    pub error: String,
}

pub type CommandParseResult = Result<Value, CommandError>;

/// Build a raw request from command-line tokens.
///
/// A leading `:` on the action is accepted, Vim style.
pub fn parse_tokens(tokens: &[String]) -> CommandParseResult {
    let Some((action, rest)) = tokens.split_first() else {
        return Err(CommandError {
            error: "Missing action".to_string(),
        });
    };
    if rest.len() > 2 {
        return Err(CommandError {
            error: format!(
                "Too many arguments: expected `action [sub-action] [target]`, got {}",
                tokens.len()
            ),
        });
    }

    let action = action.strip_prefix(':').unwrap_or(action);
    let mut request = Map::new();
    request.insert("action".to_string(), Value::String(action.to_string()));
    if let Some(sub_action) = rest.first() {
        request.insert("subAction".to_string(), Value::String(sub_action.clone()));
    }
    if let Some(target) = rest.get(1) {
        request.insert("target".to_string(), Value::String(target.clone()));
    }
    Ok(Value::Object(request))
}

/// Attempt to complete the current command input.
///
/// Returns the completed string if a unique completion exists,
/// or the longest common prefix if multiple matches exist.
pub fn complete_command_input(input: &str) -> Option<String> {
    let trimmed = input.trim_start();
    let (colon, body) = match trimmed.strip_prefix(':') {
        Some(body) => (":", body),
        None => ("", trimmed),
    };
    let ends_with_space = body.ends_with(' ');
    let mut parts: Vec<&str> = body.split_whitespace().collect();
    if parts.is_empty() {
        return None;
    }

    let current = if ends_with_space {
        ""
    } else {
        parts.pop().unwrap_or("")
    };
    let prefix_len = parts.len();

    let mut candidates: Vec<String> = Vec::new();
    if prefix_len == 0 {
        // Complete actions
        for cmd in TOP_LEVEL_COMMANDS {
            if current.is_empty() || cmd.starts_with(current) {
                candidates.push(cmd.to_string());
            }
        }
    } else {
        // Complete sub-actions from the registry; targets are free-form
        for spec in COMMANDS {
            let tokens: Vec<&str> = spec.name.split_whitespace().collect();
            if tokens.len() <= prefix_len {
                continue;
            }
            if tokens[..prefix_len] != parts[..] {
                continue;
            }
            let next = tokens[prefix_len];
            if current.is_empty() || next.starts_with(current) {
                candidates.push(next.to_string());
            }
        }
    }

    candidates.sort();
    candidates.dedup();
    if candidates.is_empty() {
        return None;
    }

    let common_prefix = longest_common_prefix(&candidates);
    if common_prefix.is_empty() || common_prefix == current {
        return None;
    }

    let mut new_parts: Vec<String> = parts.iter().map(|part| part.to_string()).collect();
    new_parts.push(common_prefix.clone());
    let mut new_input = format!("{colon}{}", new_parts.join(" "));

    // Add trailing space if unique completion
    if candidates.len() == 1 && common_prefix == candidates[0] {
        new_input.push(' ');
    }
    Some(new_input)
}

/// Find the longest common prefix among strings.
fn longest_common_prefix(items: &[String]) -> String {
    let Some((first, rest)) = items.split_first() else {
        return String::new();
    };
    let mut prefix = first.clone();
    for item in rest {
        let common = prefix
            .chars()
            .zip(item.chars())
            .take_while(|(a, b)| a == b)
            .count();
        prefix = prefix.chars().take(common).collect();
        if prefix.is_empty() {
            break;
        }
    }
    prefix
}
