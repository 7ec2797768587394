//! OpenAI-compatible chat completion gateway.
//!
//! Speaks `POST {base}/chat/completions` with function tools. Tool calls
//! in the response become [`ContentBlock::ToolUse`] blocks.

use super::{check_status, http_client, read_json, transport_error};
use async_trait::async_trait;
use serde_json::{Value, json};
use toolbridge_application::{CompletionGateway, CompletionRequest, GatewayError};
use toolbridge_domain::{ChatMessage, ContentBlock, LlmResponse, StopReason, ToolDescriptor};
use tracing::{debug, warn};

pub const DEFAULT_COMPLETION_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_COMPLETION_MODEL: &str = "gpt-4o-mini";

const OPERATION: &str = "completion";

pub struct OpenAiCompletionGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiCompletionGateway {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            base_url: DEFAULT_COMPLETION_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body(&self, request: &CompletionRequest) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": request.messages.iter().map(message_json).collect::<Vec<_>>(),
        });
        if !request.tools.is_empty() {
            body["tools"] = request.tools.iter().map(tool_json).collect();
        }
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        if let Some(temperature) = request.temperature {
            body["temperature"] = json!(temperature);
        }
        body
    }
}

fn message_json(message: &ChatMessage) -> Value {
    match message {
        ChatMessage::System { content } => json!({ "role": "system", "content": content }),
        ChatMessage::User { content } => json!({ "role": "user", "content": content }),
        ChatMessage::Assistant { content, tool_calls } if !tool_calls.is_empty() => {
            let calls: Vec<Value> = tool_calls
                .iter()
                .map(|call| {
                    json!({
                        "id": call.id,
                        "type": "function",
                        "function": {
                            "name": call.name,
                            "arguments": call.arguments.to_string(),
                        }
                    })
                })
                .collect();
            let content = if content.is_empty() {
                Value::Null
            } else {
                json!(content)
            };
            json!({ "role": "assistant", "content": content, "tool_calls": calls })
        }
        ChatMessage::Assistant { content, .. } => json!({ "role": "assistant", "content": content }),
        ChatMessage::Tool {
            tool_call_id,
            content,
            ..
        } => json!({ "role": "tool", "tool_call_id": tool_call_id, "content": content }),
    }
}

fn tool_json(tool: &ToolDescriptor) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.input_schema,
        }
    })
}

/// Map a `chat/completions` response body onto [`LlmResponse`].
fn parse_response(body: &Value) -> Result<LlmResponse, GatewayError> {
    let choice = body
        .get("choices")
        .and_then(|c| c.get(0))
        .ok_or_else(|| GatewayError::InvalidResponse("response has no choices".to_string()))?;
    let message = choice.get("message").unwrap_or(&Value::Null);

    let mut content = Vec::new();
    if let Some(text) = message.get("content").and_then(|c| c.as_str())
        && !text.is_empty()
    {
        content.push(ContentBlock::text(text));
    }

    for call in message
        .get("tool_calls")
        .and_then(|c| c.as_array())
        .into_iter()
        .flatten()
    {
        let function = call.get("function").unwrap_or(&Value::Null);
        let Some(name) = function.get("name").and_then(|n| n.as_str()) else {
            warn!("Skipping tool call without a function name");
            continue;
        };
        let arguments = function
            .get("arguments")
            .and_then(|a| a.as_str())
            .unwrap_or("{}");
        let input = serde_json::from_str(arguments).unwrap_or_else(|e| {
            warn!(tool = name, "Tool call arguments are not valid JSON: {}", e);
            json!({})
        });
        content.push(ContentBlock::ToolUse {
            id: call
                .get("id")
                .and_then(|i| i.as_str())
                .unwrap_or_default()
                .to_string(),
            name: name.to_string(),
            input,
        });
    }

    Ok(LlmResponse {
        content,
        stop_reason: choice
            .get("finish_reason")
            .and_then(|r| r.as_str())
            .map(StopReason::from_finish_reason),
        model: body
            .get("model")
            .and_then(|m| m.as_str())
            .map(|m| m.to_string()),
    })
}

#[async_trait]
impl CompletionGateway for OpenAiCompletionGateway {
    async fn complete(&self, request: &CompletionRequest) -> Result<LlmResponse, GatewayError> {
        debug!(
            model = %self.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Requesting completion"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.request_body(request))
            .send()
            .await
            .map_err(|e| transport_error(OPERATION, e))?;
        let response = check_status(OPERATION, response).await?;
        let body: Value = read_json(OPERATION, response).await?;

        parse_response(&body)
    }
}
