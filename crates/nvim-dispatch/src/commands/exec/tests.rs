use super::{normalize, Dispatcher, ExecutionResult, Status};
use crate::config::EditorConfig;
use crate::error::DispatchError;
use crate::process::{ExecResult, Invocation, ProcessRunner, FORCE_QUIT};
use async_trait::async_trait;
use serde_json::json;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Records every invocation and answers with a canned outcome.
#[derive(Clone)]
struct FakeRunner {
    calls: Arc<Mutex<Vec<Invocation>>>,
    outcome: Arc<dyn Fn() -> io::Result<ExecResult> + Send + Sync>,
}

impl FakeRunner {
    fn exiting(ok: bool, exit_code: i32, stdout: &str, stderr: &str) -> Self {
        let result = ExecResult {
            ok,
            exit_code: Some(exit_code),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        };
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            outcome: Arc::new(move || -> io::Result<ExecResult> { Ok(result.clone()) }),
        }
    }

    fn succeeding(stdout: &str) -> Self {
        Self::exiting(true, 0, stdout, "")
    }

    fn unable_to_start() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            outcome: Arc::new(|| -> io::Result<ExecResult> {
                Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    "No such file or directory",
                ))
            }),
        }
    }

    fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl ProcessRunner for FakeRunner {
    async fn run(&self, invocation: &Invocation) -> io::Result<ExecResult> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(invocation.clone());
        (self.outcome)()
    }
}

fn editor() -> EditorConfig {
    EditorConfig {
        command: "nvim".to_string(),
        args: Vec::new(),
        root: PathBuf::from("/home/me/.config/nvim"),
    }
}

fn dispatcher(runner: &FakeRunner) -> Dispatcher<FakeRunner> {
    Dispatcher::new(runner.clone(), editor())
}

/// The `-c` command that precedes the forced quit.
fn launched_command(invocation: &Invocation) -> &str {
    let args = &invocation.args;
    assert_eq!(args.last().map(String::as_str), Some(FORCE_QUIT));
    &args[args.len() - 3]
}

#[tokio::test]
async fn health_check_succeeds_with_stdout() {
    let runner = FakeRunner::succeeding("All checks passed");
    let result = dispatcher(&runner)
        .dispatch(&json!({ "action": "health" }))
        .await
        .expect("dispatch");

    assert_eq!(result, ExecutionResult::success("All checks passed"));
    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].program, "nvim");
    assert_eq!(calls[0].cwd, PathBuf::from("/home/me/.config/nvim"));
    assert_eq!(
        calls[0].args,
        vec!["--headless", "-c", "checkhealth", "-c", "qa!"]
    );
}

#[tokio::test]
async fn lsp_install_failure_reports_stderr() {
    let runner = FakeRunner::exiting(false, 1, "", "server not found");
    let result = dispatcher(&runner)
        .dispatch(&json!({ "action": "lsp", "subAction": "install", "target": "lua_ls" }))
        .await
        .expect("dispatch");

    assert_eq!(result.status, Status::Error);
    assert_eq!(result.output, "server not found");
    assert_eq!(launched_command(&runner.calls()[0]), "MasonInstall lua_ls");
}

#[tokio::test]
async fn format_run_without_target_never_launches() {
    let runner = FakeRunner::succeeding("unused");
    let err = dispatcher(&runner)
        .dispatch(&json!({ "action": "format", "subAction": "run" }))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        DispatchError::MissingTarget {
            action: "format",
            sub_action: "run",
        }
    );
    assert!(err.to_string().contains("target"));
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn unrecognized_plugin_sub_action_falls_back_to_status() {
    let runner = FakeRunner::succeeding("");
    let dispatcher = dispatcher(&runner);
    dispatcher
        .dispatch(&json!({ "action": "plugins", "subAction": "bogus" }))
        .await
        .expect("dispatch");
    dispatcher
        .dispatch(&json!({ "action": "plugins" }))
        .await
        .expect("dispatch");

    let calls = runner.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], calls[1]);
    assert_eq!(launched_command(&calls[0]), "Lazy");
}

#[tokio::test]
async fn schema_violations_never_launch() {
    let runner = FakeRunner::succeeding("unused");
    let dispatcher = dispatcher(&runner);
    let bad_requests = [
        json!({ "action": "shell" }),
        json!({ "action": "health", "extra": 1 }),
        json!({ "action": "lsp", "target": 7 }),
        json!("health"),
    ];
    for request in bad_requests {
        let err = dispatcher.dispatch(&request).await.unwrap_err();
        assert!(
            matches!(err, DispatchError::SchemaViolation { .. }),
            "{request}: {err:?}"
        );
    }
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn plugin_install_includes_target_literally() {
    let runner = FakeRunner::succeeding("installed");
    dispatcher(&runner)
        .dispatch(&json!({ "action": "plugins", "subAction": "install", "target": "foo" }))
        .await
        .expect("dispatch");

    let calls = runner.calls();
    assert!(launched_command(&calls[0]).contains("foo"));
}

#[tokio::test]
async fn spawn_failure_becomes_error_result() {
    let runner = FakeRunner::unable_to_start();
    let result = dispatcher(&runner)
        .dispatch(&json!({ "action": "lsp" }))
        .await
        .expect("dispatch");

    assert_eq!(result.status, Status::Error);
    assert!(result.output.starts_with("failed to start nvim"));
    assert!(result.output.contains("No such file or directory"));
}

#[test]
fn resolve_reports_command_without_launching() {
    let runner = FakeRunner::succeeding("unused");
    let dispatcher = dispatcher(&runner);
    let command = dispatcher
        .resolve(&json!({ "action": "health", "subAction": "anything", "target": "x" }))
        .expect("resolve");
    let invocation = dispatcher.invocation(&command);

    assert_eq!(launched_command(&invocation), "checkhealth");
    assert!(runner.calls().is_empty());
}

#[test]
fn normalize_prefers_stderr_then_stdout_then_description() {
    let failed = |stdout: &str, stderr: &str, exit_code: Option<i32>| ExecResult {
        ok: false,
        exit_code,
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
    };

    assert_eq!(
        normalize("nvim", Ok(failed("out", "err", Some(1)))),
        ExecutionResult::error("err")
    );
    assert_eq!(
        normalize("nvim", Ok(failed("out", " \n", Some(1)))),
        ExecutionResult::error("out")
    );
    assert_eq!(
        normalize("nvim", Ok(failed("", "", Some(2)))),
        ExecutionResult::error("nvim exited with status 2")
    );
    assert_eq!(
        normalize("nvim", Ok(failed("", "", None))),
        ExecutionResult::error("nvim was terminated by a signal")
    );
}

#[test]
fn normalize_success_returns_stdout_even_with_stderr() {
    let result = ExecResult {
        ok: true,
        exit_code: Some(0),
        stdout: "done".to_string(),
        stderr: "noise".to_string(),
    };
    assert_eq!(normalize("nvim", Ok(result)), ExecutionResult::success("done"));
}

#[test]
fn execution_result_serializes_with_lowercase_status() {
    let value = serde_json::to_value(ExecutionResult::error("boom")).expect("serialize");
    assert_eq!(value, json!({ "status": "error", "output": "boom" }));
}

#[cfg(unix)]
#[tokio::test]
async fn headless_dispatch_runs_real_process() {
    use crate::test_utils::fake_editor;
    use tempfile::TempDir;

    let dir = TempDir::new().expect("temp dir");
    let program = fake_editor(
        dir.path(),
        "if [ \"$3\" = \"Lazy update\" ]; then echo updated; else echo \"unexpected: $3\" >&2; exit 1; fi",
    );
    let dispatcher = Dispatcher::headless(EditorConfig {
        command: program.to_string_lossy().to_string(),
        args: Vec::new(),
        root: dir.path().to_path_buf(),
    });

    let result = dispatcher
        .dispatch(&json!({ "action": "plugins", "subAction": "update" }))
        .await
        .expect("dispatch");
    assert_eq!(result, ExecutionResult::success("updated\n"));
}
