//! Local script execution with request/response correlation.
//!
//! A [`SandboxHost`] is a message pipe to an isolated interpreter. The
//! [`ScriptSandbox`] tags every request with a fresh token and ignores any
//! response carrying another token, so a late answer from an earlier,
//! abandoned run can never be taken for the current one.

use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::{mpsc, Mutex, OnceCell};
use tracing::{debug, warn};

use crate::error::RunnerError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxRequest {
    pub token: u64,
    pub code: String,
    /// JSON text passed to `solve`; plain text is passed through as a string.
    pub input: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SandboxResponse {
    pub token: u64,
    #[serde(default)]
    pub logs: Vec<String>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// What the candidate's script produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SandboxResult {
    pub logs: Vec<String>,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
}

impl SandboxResult {
    pub fn output_text(&self) -> String {
        let mut lines = self.logs.clone();
        if let Some(result) = &self.result {
            lines.push(format!("=> {result}"));
        }
        if let Some(error) = &self.error {
            lines.push(format!("Error: {error}"));
        }
        lines.join("\n")
    }
}

impl From<SandboxResponse> for SandboxResult {
    fn from(r: SandboxResponse) -> Self {
        Self {
            logs: r.logs,
            result: r.result,
            error: r.error,
        }
    }
}

/// One message from the interpreter side of a [`SandboxHost`].
#[derive(Debug)]
pub enum HostMessage {
    Response(SandboxResponse),
    /// The interpreter itself failed before answering the request.
    Failed { token: u64, error: RunnerError },
}

impl HostMessage {
    pub fn token(&self) -> u64 {
        match self {
            HostMessage::Response(r) => r.token,
            HostMessage::Failed { token, .. } => *token,
        }
    }
}

/// Message pipe to an isolated interpreter.
#[async_trait]
pub trait SandboxHost: Send + Sync {
    async fn post(&self, request: SandboxRequest) -> Result<(), RunnerError>;

    /// Next message from the interpreter, or `None` once the host is closed.
    async fn recv(&self) -> Option<HostMessage>;
}

pub struct ScriptSandbox {
    host: Arc<dyn SandboxHost>,
    next_token: AtomicU64,
    timeout: Duration,
    // One pending request at a time; stale responses are drained by the next run.
    pending: Mutex<()>,
}

impl ScriptSandbox {
    pub fn new(host: Arc<dyn SandboxHost>, timeout: Duration) -> Self {
        Self {
            host,
            next_token: AtomicU64::new(1),
            timeout,
            pending: Mutex::new(()),
        }
    }

    pub async fn run(&self, code: &str, input: &str) -> Result<SandboxResult, RunnerError> {
        let _guard = self.pending.lock().await;
        let token = self.next_token.fetch_add(1, Ordering::SeqCst);

        self.host
            .post(SandboxRequest {
                token,
                code: code.to_string(),
                input: input.to_string(),
            })
            .await?;

        let wait = async {
            loop {
                match self.host.recv().await {
                    Some(msg) if msg.token() == token => {
                        return match msg {
                            HostMessage::Response(resp) => Ok(resp.into()),
                            HostMessage::Failed { error, .. } => Err(error),
                        };
                    }
                    Some(msg) => {
                        debug!(stale = msg.token(), pending = token, "Discarding stale sandbox message");
                    }
                    None => return Err(RunnerError::Sandbox("sandbox host closed".into())),
                }
            }
        };

        match tokio::time::timeout(self.timeout, wait).await {
            Ok(result) => result,
            Err(_) => {
                warn!(token, timeout = ?self.timeout, "Sandbox run timed out");
                Err(RunnerError::Timeout(self.timeout))
            }
        }
    }
}

/// Harness evaluated by node. Reads one request from stdin and runs the
/// script in a fresh `vm` context whose global holds only the language
/// builtins and a capturing `console`: no `process`, `require`, `fetch`,
/// timers or buffers. Writes one response line.
const NODE_HARNESS: &str = r#"
const vm = require('vm');
const PRELUDE = `
globalThis.__logs = [];
globalThis.console = (() => {
  const fmt = (a) => (typeof a === 'string' ? a : JSON.stringify(a));
  const push = (...args) => { __logs.push(args.map(fmt).join(' ')); };
  return { log: push, info: push, warn: push, error: push };
})();
`;
const INVOKE = `
;(function () {
  if (typeof solve !== 'function') return { missing: true };
  let input;
  try { input = JSON.parse(__input); } catch (_) { input = __input; }
  return { value: solve(input) };
})();
`;
let raw = '';
process.stdin.setEncoding('utf8');
process.stdin.on('data', (c) => { raw += c; });
process.stdin.on('end', async () => {
  const req = JSON.parse(raw);
  const context = vm.createContext(Object.create(null));
  let result;
  let error;
  try {
    vm.runInContext(PRELUDE, context);
    context.__input = req.input;
    const outcome = vm.runInContext(req.code + '\n' + INVOKE, context);
    if (outcome.missing) {
      result = '[No solve() function found]';
    } else {
      result = await outcome.value;
    }
  } catch (e) {
    error = String(e && e.message ? e.message : e);
  }
  const logs = Array.from(context.__logs || [], String);
  process.stdout.write(JSON.stringify({ token: req.token, logs, result, error }) + '\n');
});
"#;

/// Permission-model flags, newest spelling first. Node 20 and 21 only know
/// the experimental one.
const PERMISSION_FLAGS: &[&str] = &["--permission", "--experimental-permission"];

/// Environment handed to the interpreter: nothing but `PATH`.
fn sandbox_env() -> Vec<(String, String)> {
    std::env::var("PATH")
        .map(|path| vec![("PATH".to_string(), path)])
        .unwrap_or_default()
}

/// Find the permission flag this node accepts by running an empty script.
async fn probe_permission_flag(node_bin: &str, timeout: Duration) -> Result<&'static str, String> {
    for &flag in PERMISSION_FLAGS {
        let mut probe = Command::new(node_bin);
        probe
            .arg(flag)
            .arg("-e")
            .arg("0")
            .env_clear()
            .envs(sandbox_env())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        match tokio::time::timeout(timeout, probe.status()).await {
            Ok(Ok(status)) if status.success() => {
                debug!(node_bin, flag, "Sandbox permission flag detected");
                return Ok(flag);
            }
            Ok(Ok(status)) => debug!(node_bin, flag, %status, "Permission flag rejected"),
            Ok(Err(e)) => return Err(format!("failed to spawn {node_bin}: {e}")),
            Err(_) => return Err(format!("{node_bin} did not start within {timeout:?}")),
        }
    }
    Err(format!(
        "{node_bin} supports none of {}",
        PERMISSION_FLAGS.join(", ")
    ))
}

/// Turn the interpreter's output into its response. Output without a
/// response line is a host failure, never a program result.
fn read_response(stdout: &[u8], stderr: &[u8], exit_code: Option<i32>) -> Result<SandboxResponse, RunnerError> {
    let stdout = String::from_utf8_lossy(stdout);
    if let Some(response) = stdout
        .lines()
        .rev()
        .find_map(|line| serde_json::from_str::<SandboxResponse>(line).ok())
    {
        return Ok(response);
    }

    let stderr = String::from_utf8_lossy(stderr).trim().to_string();
    if stderr.contains("bad option") {
        return Err(RunnerError::SandboxUnavailable(stderr));
    }
    let code = exit_code.map_or_else(|| "signal".to_string(), |c| c.to_string());
    Err(RunnerError::Sandbox(format!(
        "interpreter exited ({code}) without a response: {stderr}"
    )))
}

/// Runs each request in a fresh node process under the permission model
/// (no file-system, child-process or worker access) with an empty
/// environment.
pub struct NodeSandboxHost {
    node_bin: String,
    timeout: Duration,
    permission_flag: OnceCell<Result<&'static str, String>>,
    tx: mpsc::UnboundedSender<HostMessage>,
    rx: Mutex<mpsc::UnboundedReceiver<HostMessage>>,
}

impl NodeSandboxHost {
    pub fn new(node_bin: impl Into<String>, timeout: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            node_bin: node_bin.into(),
            timeout,
            permission_flag: OnceCell::new(),
            tx,
            rx: Mutex::new(rx),
        }
    }

    async fn permission_flag(&self) -> Result<&'static str, RunnerError> {
        let probed = self
            .permission_flag
            .get_or_init(|| probe_permission_flag(&self.node_bin, self.timeout))
            .await;
        match probed {
            Ok(flag) => Ok(*flag),
            Err(reason) => Err(RunnerError::SandboxUnavailable(reason.clone())),
        }
    }

    fn command(&self, permission_flag: &str) -> Command {
        let mut cmd = Command::new(&self.node_bin);
        cmd.arg(permission_flag)
            .arg("-e")
            .arg(NODE_HARNESS)
            .env_clear()
            .envs(sandbox_env())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl SandboxHost for NodeSandboxHost {
    async fn post(&self, request: SandboxRequest) -> Result<(), RunnerError> {
        let flag = self.permission_flag().await?;
        let payload = serde_json::to_vec(&request).map_err(|e| RunnerError::Sandbox(e.to_string()))?;
        let mut child = self.command(flag).spawn().map_err(|e| {
            RunnerError::SandboxUnavailable(format!("failed to spawn {}: {e}", self.node_bin))
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&payload)
                .await
                .map_err(|e| RunnerError::Sandbox(format!("failed to send script: {e}")))?;
        }

        let tx = self.tx.clone();
        let token = request.token;
        let timeout = self.timeout;
        tokio::spawn(async move {
            let message = match tokio::time::timeout(timeout, child.wait_with_output()).await {
                Ok(Ok(output)) => {
                    match read_response(&output.stdout, &output.stderr, output.status.code()) {
                        Ok(response) => HostMessage::Response(response),
                        Err(error) => HostMessage::Failed { token, error },
                    }
                }
                Ok(Err(e)) => HostMessage::Failed {
                    token,
                    error: RunnerError::Sandbox(format!("interpreter failed: {e}")),
                },
                Err(_) => {
                    // Dropping the child kills it.
                    warn!(token, "Sandbox process killed after timeout");
                    HostMessage::Failed { token, error: RunnerError::Timeout(timeout) }
                }
            };
            let _ = tx.send(message);
        });
        Ok(())
    }

    async fn recv(&self) -> Option<HostMessage> {
        self.rx.lock().await.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Host that answers from a script of canned messages.
    struct ScriptedHost {
        tx: mpsc::UnboundedSender<HostMessage>,
        rx: Mutex<mpsc::UnboundedReceiver<HostMessage>>,
        posted: std::sync::Mutex<Vec<u64>>,
        reply: bool,
    }

    impl ScriptedHost {
        fn new(reply: bool) -> Arc<Self> {
            let (tx, rx) = mpsc::unbounded_channel();
            Arc::new(Self {
                tx,
                rx: Mutex::new(rx),
                posted: std::sync::Mutex::new(vec![]),
                reply,
            })
        }

        fn inject(&self, token: u64, result: serde_json::Value) {
            self.tx
                .send(HostMessage::Response(SandboxResponse {
                    token,
                    logs: vec![],
                    result: Some(result),
                    error: None,
                }))
                .unwrap();
        }

        fn inject_failure(&self, token: u64, error: RunnerError) {
            self.tx.send(HostMessage::Failed { token, error }).unwrap();
        }
    }

    #[async_trait]
    impl SandboxHost for ScriptedHost {
        async fn post(&self, request: SandboxRequest) -> Result<(), RunnerError> {
            self.posted.lock().unwrap().push(request.token);
            if self.reply {
                self.tx
                    .send(HostMessage::Response(SandboxResponse {
                        token: request.token,
                        logs: vec![format!("input was {}", request.input)],
                        result: Some(json!(request.token)),
                        error: None,
                    }))
                    .unwrap();
            }
            Ok(())
        }

        async fn recv(&self) -> Option<HostMessage> {
            self.rx.lock().await.recv().await
        }
    }

    #[tokio::test]
    async fn stale_responses_are_discarded() {
        let host = ScriptedHost::new(true);
        // A late answer from an abandoned earlier request.
        host.inject(0, json!("stale"));
        let sandbox = ScriptSandbox::new(host.clone(), Duration::from_secs(5));

        let result = sandbox.run("function solve(x) { return x; }", "[1,2]").await.unwrap();
        assert_eq!(result.result, Some(json!(1)));
        assert_eq!(result.logs, vec!["input was [1,2]".to_string()]);
    }

    #[tokio::test]
    async fn tokens_increase_monotonically() {
        let host = ScriptedHost::new(true);
        let sandbox = ScriptSandbox::new(host.clone(), Duration::from_secs(5));
        sandbox.run("", "1").await.unwrap();
        sandbox.run("", "2").await.unwrap();
        assert_eq!(*host.posted.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn silent_host_times_out() {
        let host = ScriptedHost::new(false);
        let sandbox = ScriptSandbox::new(host.clone(), Duration::from_secs(10));
        let err = sandbox.run("while(true){}", "").await.unwrap_err();
        assert!(matches!(err, RunnerError::Timeout(d) if d == Duration::from_secs(10)));

        // The late reply to the timed-out run is ignored by the next one.
        host.inject(1, json!("late"));
        host.inject(2, json!("fresh"));
        let result = sandbox.run("", "").await.unwrap();
        assert_eq!(result.result, Some(json!("fresh")));
    }

    #[tokio::test]
    async fn host_failure_is_an_error_not_a_result() {
        let host = ScriptedHost::new(false);
        let sandbox = ScriptSandbox::new(host.clone(), Duration::from_secs(5));

        // A failure for an earlier token is skipped like any stale message.
        host.inject_failure(0, RunnerError::Sandbox("old".into()));
        host.inject_failure(1, RunnerError::SandboxUnavailable("bad option".into()));
        let err = sandbox.run("function solve() {}", "").await.unwrap_err();
        assert!(matches!(err, RunnerError::SandboxUnavailable(reason) if reason == "bad option"));
    }

    #[test]
    fn response_line_is_read_from_stdout() {
        let stdout = b"noise\n{\"token\":3,\"logs\":[\"hi\"],\"result\":42}\n";
        let resp = read_response(stdout, b"", Some(0)).unwrap();
        assert_eq!(resp.token, 3);
        assert_eq!(resp.logs, vec!["hi".to_string()]);
        assert_eq!(resp.result, Some(json!(42)));
    }

    #[test]
    fn rejected_flag_means_unavailable() {
        let err = read_response(b"", b"node: bad option: --permission\n", Some(9)).unwrap_err();
        assert!(matches!(err, RunnerError::SandboxUnavailable(msg) if msg.contains("--permission")));
    }

    #[test]
    fn crash_without_response_is_a_host_error() {
        let err = read_response(b"", b"FATAL ERROR: heap out of memory", Some(134)).unwrap_err();
        match err {
            RunnerError::Sandbox(msg) => {
                assert!(msg.contains("134"));
                assert!(msg.contains("heap out of memory"));
            }
            other => panic!("expected Sandbox error, got {other:?}"),
        }
    }

    #[test]
    fn interpreter_gets_only_path() {
        std::env::set_var("ACEMOCK_SANDBOX_TEST_API_KEY", "sekret-key");
        let env = sandbox_env();
        assert!(env.iter().all(|(key, _)| key == "PATH"));

        let host = NodeSandboxHost::new("node", Duration::from_secs(1));
        let cmd = host.command("--permission");
        for (key, _) in cmd.as_std().get_envs() {
            assert_eq!(key, "PATH");
        }
    }

    #[tokio::test]
    async fn missing_node_binary_is_unavailable() {
        let host = NodeSandboxHost::new("/nonexistent/acemock-node", Duration::from_secs(1));
        let err = host
            .post(SandboxRequest { token: 1, code: String::new(), input: String::new() })
            .await
            .unwrap_err();
        assert!(matches!(err, RunnerError::SandboxUnavailable(_)));
    }

    #[tokio::test]
    async fn interpreter_rejecting_every_flag_is_unavailable() {
        // `false` starts fine but exits non-zero for any arguments.
        let host = NodeSandboxHost::new("false", Duration::from_secs(5));
        let err = host
            .post(SandboxRequest { token: 1, code: String::new(), input: String::new() })
            .await
            .unwrap_err();
        assert!(matches!(err, RunnerError::SandboxUnavailable(msg) if msg.contains("--permission")));
    }

    /// Runs `code` under a real node, or returns `None` when none is installed.
    async fn run_with_node(code: &str, input: &str) -> Option<SandboxResult> {
        let host = NodeSandboxHost::new("node", Duration::from_secs(20));
        let sandbox = ScriptSandbox::new(Arc::new(host), Duration::from_secs(20));
        match sandbox.run(code, input).await {
            Ok(result) => Some(result),
            Err(RunnerError::SandboxUnavailable(_)) => None,
            Err(e) => panic!("sandbox failed: {e}"),
        }
    }

    #[tokio::test]
    async fn node_script_sees_no_host_globals() {
        std::env::set_var("ACEMOCK_SANDBOX_TEST_API_KEY", "sekret-key");
        let code = r#"
            function solve() {
                const escaped = console.log.constructor.constructor(
                    'return typeof process === "undefined" ? "none" : String(process.env.ACEMOCK_SANDBOX_TEST_API_KEY)'
                )();
                return [typeof fetch, typeof require, typeof process, typeof module, escaped];
            }
        "#;
        let Some(result) = run_with_node(code, "").await else {
            return;
        };
        assert_eq!(result.error, None);
        assert_eq!(
            result.result,
            Some(json!(["undefined", "undefined", "undefined", "undefined", "none"]))
        );
    }

    #[tokio::test]
    async fn node_script_receives_parsed_input_and_logs() {
        let code = "function solve(x) { console.log('got', x); return x.a + 1; }";
        let Some(result) = run_with_node(code, r#"{"a": 41}"#).await else {
            return;
        };
        assert_eq!(result.result, Some(json!(42)));
        assert_eq!(result.logs, vec![r#"got {"a":41}"#.to_string()]);
    }

    #[tokio::test]
    async fn node_script_without_solve_is_reported() {
        let Some(result) = run_with_node("const x = 1;", "").await else {
            return;
        };
        assert_eq!(result.result, Some(json!("[No solve() function found]")));
    }

    #[test]
    fn output_text_lists_logs_then_result() {
        let r = SandboxResult {
            logs: vec!["hello".into()],
            result: Some(json!([1, 2])),
            error: None,
        };
        assert_eq!(r.output_text(), "hello\n=> [1,2]");
    }
}
