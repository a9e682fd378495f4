use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use nvim_dispatch::commands::{command_help_lines, complete_command_input, parse_tokens};
use nvim_dispatch::{load_config_with, DispatchError, Dispatcher, ExecutionResult, ProcessRunner};

const LOG_ENV: &str = "NVIM_DISPATCH_LOG";

const EXIT_OK: u8 = 0;
/// Exit code when the editor ran but reported failure.
const EXIT_FAILED: u8 = 1;
/// Exit code for malformed requests; nothing was launched.
const EXIT_USAGE: u8 = 2;

/// Run Neovim health, plugin, formatter and LSP commands headless.
#[derive(Parser, Debug)]
#[command(name = "nvim-dispatch", version)]
struct Cli {
    /// Working directory for the editor (defaults to the editor config dir)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Editor executable
    #[arg(long, global = true)]
    editor: Option<String>,

    /// Config file used in place of `.config/nvim-dispatch/config.toml`
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Dispatch a JSON request (argument or stdin) and print the JSON result
    Request {
        /// e.g. '{"action":"lsp","subAction":"install","target":"lua_ls"}'
        json: Option<String>,
    },
    /// Dispatch `action [sub-action] [target]` and print the editor output
    Run {
        /// Print the editor invocation instead of running it
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        #[arg(required = true, num_args = 1..=3, value_name = "ACTION [SUB_ACTION] [TARGET]")]
        words: Vec<String>,
    },
    /// List available actions and sub-actions
    Commands,
    /// Complete a partially typed `action sub-action` line
    Complete { input: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    ExitCode::from(run(&cli).await)
}

async fn run(cli: &Cli) -> u8 {
    match &cli.command {
        CliCommand::Commands => {
            for line in command_help_lines() {
                println!("{line}");
            }
            EXIT_OK
        }
        CliCommand::Complete { input } => {
            if let Some(completed) = complete_command_input(input) {
                println!("{completed}");
            }
            EXIT_OK
        }
        CliCommand::Request { json } => {
            let raw = match read_request(json.as_deref()) {
                Ok(raw) => raw,
                Err(message) => return usage_error(&message),
            };
            let dispatcher = match build_dispatcher(cli) {
                Ok(dispatcher) => dispatcher,
                Err(message) => return usage_error(&message),
            };
            match dispatcher.dispatch(&raw).await {
                Ok(result) => print_json(&result),
                Err(err) => contract_error(&err),
            }
        }
        CliCommand::Run { dry_run, words } => {
            let raw = match parse_tokens(words) {
                Ok(raw) => raw,
                Err(err) => return usage_error(&err.error),
            };
            let dispatcher = match build_dispatcher(cli) {
                Ok(dispatcher) => dispatcher,
                Err(message) => return usage_error(&message),
            };
            if *dry_run {
                return match dry_run_line(&dispatcher, &raw) {
                    Ok(line) => {
                        println!("{line}");
                        EXIT_OK
                    }
                    Err(err) => contract_error(&err),
                };
            }
            match dispatcher.dispatch(&raw).await {
                Ok(result) => print_output(&result),
                Err(err) => contract_error(&err),
            }
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "nvim_dispatch=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn build_dispatcher(cli: &Cli) -> Result<Dispatcher, String> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let mut editor = load_config_with(&cwd, cli.config.as_deref())
        .map_err(|err| match cli.config.as_deref() {
            Some(path) => format!("Failed to read config {}: {err}", path.display()),
            None => format!("Failed to read config: {err}"),
        })?
        .editor;
    if let Some(command) = cli.editor.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        editor.command = command.to_string();
    }
    if let Some(root) = cli.root.as_deref() {
        editor.root = absolute(&cwd, root);
    }
    tracing::debug!(editor = %editor.command, root = %editor.root.display(), "loaded config");
    Ok(Dispatcher::headless(editor))
}

/// The shell-quoted invocation a request would launch.
fn dry_run_line<R: ProcessRunner>(
    dispatcher: &Dispatcher<R>,
    raw: &Value,
) -> Result<String, DispatchError> {
    let command = dispatcher.resolve(raw)?;
    Ok(dispatcher.invocation(&command).display())
}

fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

fn read_request(arg: Option<&str>) -> Result<Value, String> {
    let text = match arg {
        Some(text) => text.to_string(),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|err| format!("Failed to read request from stdin: {err}"))?;
            buffer
        }
    };
    serde_json::from_str(&text).map_err(|err| format!("Request is not valid JSON: {err}"))
}

fn print_json(result: &ExecutionResult) -> u8 {
    match serde_json::to_string(result) {
        Ok(json) => {
            println!("{json}");
            result_code(result)
        }
        Err(err) => usage_error(&format!("Failed to encode result: {err}")),
    }
}

fn print_output(result: &ExecutionResult) -> u8 {
    let output = result.output.trim_end();
    if result.is_success() {
        if !output.is_empty() {
            println!("{output}");
        }
    } else {
        eprintln!("{output}");
    }
    result_code(result)
}

fn result_code(result: &ExecutionResult) -> u8 {
    if result.is_success() {
        EXIT_OK
    } else {
        EXIT_FAILED
    }
}

fn contract_error(err: &DispatchError) -> u8 {
    usage_error(&err.to_string())
}

fn usage_error(message: &str) -> u8 {
    eprintln!("error: {message}");
    EXIT_USAGE
}
