//! Subprocess protocol client: one connection to one tool provider.
//!
//! The provider is a child process speaking newline-delimited JSON-RPC 2.0
//! over its standard streams. [`ProtocolClient`] owns:
//!
//! - a background **reader task** that frames stdout into messages and
//!   dispatches them (response correlation or notification observer),
//! - a **stderr task** that re-emits provider stderr as tracing events,
//! - an **exit watcher** that notices the child dying and fails every
//!   pending request at once instead of letting them time out.
//!
//! Requests are correlated by id through a pending table of `oneshot`
//! senders. An entry is inserted before the request line is written and is
//! removed by exactly one of: the matching response, the timeout, provider
//! termination, or `disconnect()`.

use super::error::{McpError, Result};
use super::protocol::{
    CallToolParams, INTERNAL_ERROR_CODE, InitializeParams, JsonRpcNotification, JsonRpcRequest,
    METHOD_INITIALIZE, METHOD_TOOLS_CALL, METHOD_TOOLS_LIST, NOTIFICATION_INITIALIZED,
    PROTOCOL_VERSION, RpcError, ToolInfo, ToolsListResult,
};
use super::transport::{LineFramer, encode_line, message_id, message_method};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStderr, Command};
use tokio::sync::{Mutex, oneshot};
use tokio_util::sync::CancellationToken;
use toolbridge_domain::ProviderSpec;
use tracing::{debug, info, trace, warn};

/// Deadline for every request, including the handshake.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const READ_BUFFER_SIZE: usize = 8 * 1024;

/// Receives messages from the provider that are not responses.
pub trait NotificationObserver: Send + Sync {
    fn on_notification(&self, provider: &str, method: &str, params: Option<&Value>);
}

/// Default observer: log only.
pub struct TracingObserver;

impl NotificationObserver for TracingObserver {
    fn on_notification(&self, provider: &str, method: &str, params: Option<&Value>) {
        if method == "notifications/message" {
            let level = params
                .and_then(|p| p.get("level"))
                .and_then(|l| l.as_str())
                .unwrap_or("info");
            let data = params.and_then(|p| p.get("data"));
            info!(provider, level, data = ?data, "Provider log message");
        } else {
            debug!(provider, method, "Provider notification");
        }
    }
}

type PendingSender = oneshot::Sender<Result<Value>>;
type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// State shared with the reader task and the exit watcher.
struct Shared {
    provider: String,
    /// Never held across `.await`.
    pending: StdMutex<HashMap<u64, PendingSender>>,
    connected: AtomicBool,
}

impl Shared {
    fn pending(&self) -> MutexGuard<'_, HashMap<u64, PendingSender>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn take_pending(&self, id: u64) -> Option<PendingSender> {
        self.pending().remove(&id)
    }

    /// Remove every pending entry, then complete each with `error()`.
    fn fail_all(&self, error: fn() -> McpError) {
        let drained: Vec<_> = self.pending().drain().collect();
        if !drained.is_empty() {
            debug!(
                provider = %self.provider,
                count = drained.len(),
                "Failing pending requests"
            );
        }
        for (_, tx) in drained {
            let _ = tx.send(Err(error()));
        }
    }

    fn mark_terminated(&self) {
        self.connected.store(false, Ordering::SeqCst);
        self.fail_all(|| McpError::ProviderTerminated);
    }

    fn dispatch(&self, message: Value, observer: &dyn NotificationObserver) {
        if let Some(id) = message_id(&message)
            && let Some(tx) = self.take_pending(id)
        {
            let outcome = match message.get("error").filter(|e| !e.is_null()) {
                Some(error) => {
                    let error = serde_json::from_value::<RpcError>(error.clone()).unwrap_or(
                        RpcError {
                            code: INTERNAL_ERROR_CODE,
                            message: error.to_string(),
                        },
                    );
                    Err(McpError::Rpc {
                        code: error.code,
                        message: error.message,
                    })
                }
                None => Ok(message.get("result").cloned().unwrap_or(Value::Null)),
            };
            trace!(provider = %self.provider, id, "Response received");
            let _ = tx.send(outcome);
            return;
        }

        if let Some(method) = message_method(&message) {
            observer.on_notification(&self.provider, method, message.get("params"));
            return;
        }

        debug!(
            provider = %self.provider,
            id = ?message.get("id"),
            "Dropping message with no pending request"
        );
    }
}

/// Client for one tool provider process.
pub struct ProtocolClient {
    spec: ProviderSpec,
    request_timeout: Duration,
    observer: Arc<dyn NotificationObserver>,
    shared: Arc<Shared>,
    /// Starts at 1, never reused for the lifetime of the client.
    next_id: AtomicU64,
    /// Child stdin; the lock serializes writes in call order.
    writer: Mutex<Option<BoxedWriter>>,
    /// Cancelled on disconnect; stops the reader and kills the child.
    shutdown: StdMutex<Option<CancellationToken>>,
    server_info: StdMutex<Option<Value>>,
}

impl ProtocolClient {
    pub fn new(spec: ProviderSpec) -> Self {
        let shared = Arc::new(Shared {
            provider: spec.name.clone(),
            pending: StdMutex::new(HashMap::new()),
            connected: AtomicBool::new(false),
        });
        Self {
            spec,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            observer: Arc::new(TracingObserver),
            shared,
            next_id: AtomicU64::new(1),
            writer: Mutex::new(None),
            shutdown: StdMutex::new(None),
            server_info: StdMutex::new(None),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn NotificationObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn spec(&self) -> &ProviderSpec {
        &self.spec
    }

    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }

    /// `serverInfo` from the handshake response, if the provider sent one.
    pub fn server_info(&self) -> Option<Value> {
        self.server_info
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Spawn the provider process and run the handshake.
    pub async fn connect(&self) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }

        debug!(
            provider = %self.spec.name,
            command = %self.spec.command,
            args = ?self.spec.args,
            "Spawning provider"
        );

        let mut cmd = Command::new(&self.spec.command);
        cmd.args(&self.spec.args)
            .envs(&self.spec.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Linux: request kernel to send SIGTERM to child when parent dies.
        // This catches cases where Drop doesn't run (SIGKILL, OOM kill).
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        let mut child = cmd.spawn().map_err(|source| McpError::Spawn {
            provider: self.spec.name.clone(),
            source,
        })?;

        let stdin = child.stdin.take().ok_or_else(|| self.missing_pipe("stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| self.missing_pipe("stdout"))?;
        if let Some(stderr) = child.stderr.take() {
            spawn_stderr_logger(self.spec.name.clone(), stderr);
        }

        let token = self.attach(Box::new(stdout), Box::new(stdin)).await;
        spawn_exit_watcher(child, token, Arc::clone(&self.shared));

        if let Err(e) = self.handshake().await {
            self.disconnect().await;
            return Err(e);
        }
        Ok(())
    }

    /// Run the protocol over an already-open stream pair instead of a child.
    pub async fn connect_with<R, W>(&self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        if self.is_connected() {
            return Ok(());
        }
        self.attach(Box::new(reader), Box::new(writer)).await;
        if let Err(e) = self.handshake().await {
            self.disconnect().await;
            return Err(e);
        }
        Ok(())
    }

    fn missing_pipe(&self, stream: &str) -> McpError {
        McpError::Spawn {
            provider: self.spec.name.clone(),
            source: std::io::Error::other(format!("{} was not captured", stream)),
        }
    }

    async fn attach(&self, reader: BoxedReader, writer: BoxedWriter) -> CancellationToken {
        let token = CancellationToken::new();
        if let Some(previous) = self
            .shutdown
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(token.clone())
        {
            previous.cancel();
        }

        *self.writer.lock().await = Some(writer);
        self.shared.connected.store(true, Ordering::SeqCst);

        tokio::spawn(reader_loop(
            reader,
            Arc::clone(&self.shared),
            Arc::clone(&self.observer),
            token.clone(),
        ));
        token
    }

    async fn handshake(&self) -> Result<()> {
        let params = serde_json::to_value(InitializeParams::default())?;
        let result = self
            .send_request(METHOD_INITIALIZE, Some(params))
            .await
            .map_err(|e| match e {
                McpError::Timeout { .. } => e,
                other => McpError::Handshake {
                    reason: other.to_string(),
                },
            })?;

        if let Some(version) = result.get("protocolVersion").and_then(|v| v.as_str())
            && version != PROTOCOL_VERSION
        {
            debug!(
                provider = %self.spec.name,
                version,
                "Provider answered with a different protocol version"
            );
        }
        *self.server_info.lock().unwrap_or_else(|e| e.into_inner()) =
            result.get("serverInfo").cloned();

        self.send_notification(NOTIFICATION_INITIALIZED, None)
            .await
            .map_err(|e| McpError::Handshake {
                reason: e.to_string(),
            })?;

        info!(provider = %self.spec.name, "Provider connected");
        Ok(())
    }

    /// Send a request and wait for its response, bounded by the request timeout.
    pub async fn send_request(&self, method: &str, params: Option<Value>) -> Result<Value> {
        if !self.is_connected() {
            return Err(McpError::NotConnected);
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, mut rx) = oneshot::channel();
        self.shared.pending().insert(id, tx);

        let line = match encode_line(&JsonRpcRequest::new(id, method, params)) {
            Ok(line) => line,
            Err(e) => {
                self.shared.take_pending(id);
                return Err(e.into());
            }
        };
        if let Err(e) = self.write_line(&line).await {
            self.shared.take_pending(id);
            return Err(e);
        }
        trace!(provider = %self.spec.name, id, method, "Request sent");

        match tokio::time::timeout(self.request_timeout, &mut rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(McpError::Disconnected),
            Err(_) => {
                if self.shared.take_pending(id).is_some() {
                    warn!(provider = %self.spec.name, id, method, "Request timed out");
                    Err(McpError::Timeout {
                        method: method.to_string(),
                    })
                } else {
                    // Completed between the deadline firing and the removal.
                    rx.try_recv().unwrap_or_else(|_| {
                        Err(McpError::Timeout {
                            method: method.to_string(),
                        })
                    })
                }
            }
        }
    }

    /// Fire-and-forget message.
    pub async fn send_notification(&self, method: &str, params: Option<Value>) -> Result<()> {
        if !self.is_connected() {
            return Err(McpError::NotConnected);
        }
        let line = encode_line(&JsonRpcNotification::new(method, params))?;
        self.write_line(&line).await
    }

    async fn write_line(&self, line: &[u8]) -> Result<()> {
        let mut guard = self.writer.lock().await;
        let writer = guard.as_mut().ok_or(McpError::NotConnected)?;
        writer.write_all(line).await?;
        writer.flush().await?;
        Ok(())
    }

    /// All tools the provider advertises, following `nextCursor` pages.
    pub async fn list_capabilities(&self) -> Result<Vec<ToolInfo>> {
        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;
        let mut seen = HashSet::new();

        loop {
            let params = cursor.as_ref().map(|c| serde_json::json!({ "cursor": c }));
            let result = self.send_request(METHOD_TOOLS_LIST, params).await?;
            let page: ToolsListResult = serde_json::from_value(result)?;
            tools.extend(page.tools);

            match page.next_cursor.filter(|c| !c.is_empty()) {
                Some(next) if seen.insert(next.clone()) => cursor = Some(next),
                Some(next) => {
                    warn!(provider = %self.spec.name, cursor = %next, "Provider repeated a page cursor");
                    break;
                }
                None => break,
            }
        }

        debug!(provider = %self.spec.name, count = tools.len(), "Listed capabilities");
        Ok(tools)
    }

    /// Invoke a tool by its local name; returns the raw result payload.
    pub async fn call_capability(&self, local_name: &str, arguments: Value) -> Result<Value> {
        let params = serde_json::to_value(CallToolParams {
            name: local_name,
            arguments,
        })?;
        self.send_request(METHOD_TOOLS_CALL, Some(params)).await
    }

    /// Stop the provider. Safe to call more than once.
    pub async fn disconnect(&self) {
        let was_connected = self.shared.connected.swap(false, Ordering::SeqCst);
        self.shared.fail_all(|| McpError::Disconnected);

        let token = self
            .shutdown
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(token) = token {
            token.cancel();
        }

        let writer = self.writer.lock().await.take();
        if let Some(mut writer) = writer {
            let _ = writer.shutdown().await;
        }

        if was_connected {
            info!(provider = %self.spec.name, "Provider disconnected");
        }
    }

    #[cfg(test)]
    pub(crate) fn pending_count(&self) -> usize {
        self.shared.pending().len()
    }
}

impl Drop for ProtocolClient {
    fn drop(&mut self) {
        let token = self
            .shutdown
            .get_mut()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(token) = token {
            token.cancel();
        }
    }
}

/// Background reader, the single owner of the provider's stdout.
async fn reader_loop(
    mut reader: BoxedReader,
    shared: Arc<Shared>,
    observer: Arc<dyn NotificationObserver>,
    token: CancellationToken,
) {
    let mut framer = LineFramer::new();
    let mut buf = vec![0u8; READ_BUFFER_SIZE];

    loop {
        let read = tokio::select! {
            _ = token.cancelled() => return,
            read = reader.read(&mut buf) => read,
        };
        match read {
            Ok(0) => {
                debug!(provider = %shared.provider, "Provider closed its output stream");
                break;
            }
            Ok(n) => {
                for message in framer.push(&buf[..n]) {
                    shared.dispatch(message, observer.as_ref());
                }
            }
            Err(e) => {
                warn!(provider = %shared.provider, "Read error: {}", e);
                break;
            }
        }
    }

    if !token.is_cancelled() {
        shared.mark_terminated();
    }
}

/// Wait for the child to exit, or kill it once `token` is cancelled.
fn spawn_exit_watcher(mut child: Child, token: CancellationToken, shared: Arc<Shared>) {
    tokio::spawn(async move {
        tokio::select! {
            status = child.wait() => {
                if token.is_cancelled() {
                    return;
                }
                match status {
                    Ok(status) => info!(provider = %shared.provider, %status, "Provider exited"),
                    Err(e) => warn!(provider = %shared.provider, "Failed to wait on provider: {}", e),
                }
                shared.mark_terminated();
            }
            _ = token.cancelled() => {
                if let Err(e) = child.kill().await {
                    debug!(provider = %shared.provider, "Kill failed: {}", e);
                }
            }
        }
    });
}

/// Forward provider stderr lines to tracing.
fn spawn_stderr_logger(provider: String, stderr: ChildStderr) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if !line.trim().is_empty() {
                info!(target: "toolbridge::provider", provider = %provider, "{}", line);
            }
        }
    });
}
