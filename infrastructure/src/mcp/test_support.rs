//! In-process scripted providers for client and registry tests.

use super::client::ProtocolClient;
use super::protocol::PROTOCOL_VERSION;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, ReadHalf, WriteHalf};
use toolbridge_domain::ProviderSpec;

/// What the scripted provider does with one incoming message.
pub(crate) enum Reply {
    Result(Value),
    Error { code: i64, message: String },
    /// Write nothing.
    Ignore,
    /// Respond after sleeping; blocks later messages meanwhile.
    Delayed(Duration, Value),
    /// Buffer the response until `batch` are held, then write them newest first.
    Held { batch: usize, result: Value },
    /// Write this text verbatim.
    Raw(String),
    /// Close both streams.
    Hangup,
}

pub(crate) type ClientStreams = (ReadHalf<DuplexStream>, WriteHalf<DuplexStream>);

/// Spawn a provider task answering each line with `handler`.
///
/// The handler sees notifications too. For them only `Raw` and `Hangup`
/// have an effect since there is no id to respond to.
pub(crate) fn scripted_provider<F>(mut handler: F) -> ClientStreams
where
    F: FnMut(&Value) -> Reply + Send + 'static,
{
    let (client_side, provider_side) = tokio::io::duplex(64 * 1024);

    tokio::spawn(async move {
        let (read, mut write) = tokio::io::split(provider_side);
        let mut lines = BufReader::new(read).lines();
        let mut held: Vec<String> = Vec::new();

        while let Ok(Some(line)) = lines.next_line().await {
            let Ok(message) = serde_json::from_str::<Value>(&line) else {
                continue;
            };
            let id = message.get("id").cloned();

            let text = match handler(&message) {
                Reply::Hangup => return,
                Reply::Raw(raw) => raw,
                _ if id.is_none() => continue,
                Reply::Ignore => continue,
                Reply::Result(result) => response_line(id, json!({ "result": result })),
                Reply::Error { code, message } => response_line(
                    id,
                    json!({ "error": { "code": code, "message": message } }),
                ),
                Reply::Delayed(delay, result) => {
                    tokio::time::sleep(delay).await;
                    response_line(id, json!({ "result": result }))
                }
                Reply::Held { batch, result } => {
                    held.push(response_line(id, json!({ "result": result })));
                    if held.len() < batch {
                        continue;
                    }
                    held.drain(..).rev().collect()
                }
            };

            if write.write_all(text.as_bytes()).await.is_err() {
                return;
            }
        }
    });

    tokio::io::split(client_side)
}

fn response_line(id: Option<Value>, mut body: Value) -> String {
    body["jsonrpc"] = json!("2.0");
    body["id"] = id.unwrap_or(Value::Null);
    format!("{}\n", body)
}

/// Handler for a well-behaved provider advertising `tools`.
///
/// `tools/call` answers with a single text block `called <name>`.
pub(crate) fn tool_provider(tools: &[&str]) -> impl FnMut(&Value) -> Reply + Send + 'static {
    answering_provider(tools, "called")
}

/// Like [`tool_provider`], but `tools/call` answers `<prefix> <name>`.
pub(crate) fn answering_provider(
    tools: &[&str],
    prefix: &str,
) -> impl FnMut(&Value) -> Reply + Send + 'static {
    let prefix = prefix.to_string();
    let tools: Vec<Value> = tools
        .iter()
        .map(|name| {
            json!({
                "name": name,
                "description": format!("{} tool", name),
                "inputSchema": { "type": "object", "properties": {} }
            })
        })
        .collect();

    move |message| match message.get("method").and_then(|m| m.as_str()) {
        Some("initialize") => Reply::Result(json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": { "name": "scripted", "version": "0.0.1" }
        })),
        Some("tools/list") => Reply::Result(json!({ "tools": tools })),
        Some("tools/call") => {
            let name = message["params"]["name"].as_str().unwrap_or_default();
            Reply::Result(json!({
                "content": [{ "type": "text", "text": format!("{} {}", prefix, name) }],
                "isError": false
            }))
        }
        _ if message.get("id").is_none() => Reply::Ignore,
        _ => Reply::Error {
            code: -32601,
            message: "Method not found".to_string(),
        },
    }
}

/// A client already past the handshake with a scripted provider.
pub(crate) async fn connected_client<F>(name: &str, handler: F) -> Arc<ProtocolClient>
where
    F: FnMut(&Value) -> Reply + Send + 'static,
{
    let (reader, writer) = scripted_provider(handler);
    let client = ProtocolClient::new(ProviderSpec::new(name, "scripted"))
        .with_request_timeout(Duration::from_millis(500));
    client
        .connect_with(reader, writer)
        .await
        .expect("scripted handshake");
    Arc::new(client)
}
