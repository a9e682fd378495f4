//! Configuration loading and merging.
//!
//! Config is loaded from two sources with the project taking precedence:
//! 1. User-level: `$XDG_CONFIG_HOME/nvim-dispatch/config.toml`
//! 2. Project-level: `<cwd>/.config/nvim-dispatch/config.toml`
//!
//! An explicit `--config <file>` replaces the project layer. Command-line
//! flags are applied on top by the binary. Uses TOML format with serde.
//!
//! ```toml
//! [editor]
//! command = "nvim"
//! args = ["--noplugin"]
//! root = "~/.config/nvim"
//! ```

use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const DEFAULT_EDITOR_COMMAND: &str = "nvim";
const CONFIG_DIR_NAME: &str = "nvim-dispatch";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone)]
pub struct Config {
    pub editor: EditorConfig,
}

/// How and where the editor is launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    pub command: String,
    /// Extra arguments placed before `--headless`.
    pub args: Vec<String>,
    /// Working directory for every launch.
    pub root: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    editor: Option<RawEditor>,
}

#[derive(Debug, Default, Deserialize)]
struct RawEditor {
    #[serde(alias = "cmd")]
    command: Option<String>,
    args: Option<Vec<String>>,
    #[serde(alias = "cwd")]
    root: Option<String>,
}

/// Read an optional config layer. A missing file is normal; any other
/// read failure is logged and the layer skipped.
fn read_toml(path: &Path) -> Option<RawConfig> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable config");
            return None;
        }
    };
    parse_toml(path, &contents)
}

fn parse_toml(path: &Path, contents: &str) -> Option<RawConfig> {
    if contents.trim().is_empty() {
        return None;
    }
    match toml::from_str::<RawConfig>(contents) {
        Ok(config) => Some(config),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "ignoring malformed config");
            None
        }
    }
}

fn merge_config(user: Option<RawConfig>, project: Option<RawConfig>, cwd: &Path) -> Config {
    let project_editor = project.as_ref().and_then(|c| c.editor.as_ref());
    let user_editor = user.as_ref().and_then(|c| c.editor.as_ref());

    let command = project_editor
        .and_then(|e| e.command.clone())
        .or_else(|| user_editor.and_then(|e| e.command.clone()))
        .map(|command| command.trim().to_string())
        .filter(|command| !command.is_empty())
        .unwrap_or_else(|| DEFAULT_EDITOR_COMMAND.to_string());
    let args = project_editor
        .and_then(|e| e.args.clone())
        .or_else(|| user_editor.and_then(|e| e.args.clone()))
        .unwrap_or_default();
    let root = project_editor
        .and_then(|e| e.root.clone())
        .or_else(|| user_editor.and_then(|e| e.root.clone()))
        .map(|root| resolve_root(&root, cwd))
        .unwrap_or_else(|| default_root(cwd));

    Config {
        editor: EditorConfig {
            command,
            args,
            root,
        },
    }
}

/// Expand a leading `~/` and anchor relative paths at `cwd`.
fn resolve_root(raw: &str, cwd: &Path) -> PathBuf {
    let expanded = match raw.strip_prefix("~/") {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(raw),
        },
        None if raw == "~" => dirs::home_dir().unwrap_or_else(|| PathBuf::from(raw)),
        None => PathBuf::from(raw),
    };
    if expanded.is_absolute() {
        expanded
    } else {
        cwd.join(expanded)
    }
}

/// The editor's own config directory, where its plugin spec lives.
fn default_root(cwd: &Path) -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("nvim"))
        .unwrap_or_else(|| cwd.to_path_buf())
}

pub fn user_config_path() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

pub fn project_config_path(cwd: &Path) -> PathBuf {
    cwd.join(".config")
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

pub fn load_config(cwd: &Path) -> Config {
    let project_config = read_toml(&project_config_path(cwd));
    merge_config(read_user_config(), project_config, cwd)
}

/// Load config, reading `override_path` in place of the project file.
///
/// Unlike the layered files, an override that cannot be read is an error.
pub fn load_config_with(cwd: &Path, override_path: Option<&Path>) -> io::Result<Config> {
    let Some(path) = override_path else {
        return Ok(load_config(cwd));
    };
    let contents = fs::read_to_string(path)?;
    let project_config = parse_toml(path, &contents);
    Ok(merge_config(read_user_config(), project_config, cwd))
}

fn read_user_config() -> Option<RawConfig> {
    user_config_path().and_then(|path| read_toml(&path))
}
