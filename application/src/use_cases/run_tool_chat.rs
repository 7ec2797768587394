//! Run Tool Chat use case.
//!
//! Sends a conversation to the completion API and, when tools are enabled,
//! runs the bounded tool loop over the capability registry:
//!
//! ```text
//! complete(messages, tools)
//!     │ tool calls?  ── no ──▶ answer
//!     ▼ yes (round < max)
//! invoke all calls concurrently
//!     │ append assistant turn + one tool result per call
//!     └──▶ complete(...) again
//! ```
//!
//! Tool failures are reported back to the model as error results; they do
//! not fail the request.

use crate::config::{ExecutionParams, MAX_TOOL_ROUNDS};
use crate::ports::capability_registry::CapabilityRegistryPort;
use crate::ports::completion::{CompletionGateway, CompletionRequest, GatewayError};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use toolbridge_domain::{ChatMessage, PromptTemplate, ToolCall};
use tracing::{debug, info, warn};

/// Characters of tool output kept in the invocation summary.
const OUTPUT_PREVIEW_CHARS: usize = 200;

#[derive(Error, Debug)]
pub enum RunToolChatError {
    #[error("No messages to send")]
    EmptyConversation,

    #[error("Gateway error: {0}")]
    GatewayError(#[from] GatewayError),

    #[error("No response from model")]
    EmptyResponse,
}

#[derive(Debug, Clone)]
pub struct RunToolChatInput {
    pub messages: Vec<ChatMessage>,
    /// Replaces any system message in `messages`.
    pub system: Option<String>,
    /// Offer the registry's capabilities as tools.
    pub use_tools: bool,
    pub execution: ExecutionParams,
}

impl RunToolChatInput {
    pub fn new(messages: Vec<ChatMessage>, execution: ExecutionParams) -> Self {
        Self {
            messages,
            system: None,
            use_tools: false,
            execution,
        }
    }

    pub fn with_system(mut self, system: Option<String>) -> Self {
        self.system = system;
        self
    }

    pub fn with_tools(mut self, use_tools: bool) -> Self {
        self.use_tools = use_tools;
        self
    }
}

/// Summary of one executed tool call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInvocation {
    pub round: usize,
    pub name: String,
    pub arguments: serde_json::Value,
    pub is_error: bool,
    pub output_preview: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunToolChatOutput {
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Tool rounds executed
    pub rounds: usize,
    pub tool_invocations: Vec<ToolInvocation>,
    /// The model still wanted tools when the round cap was hit.
    pub round_limit_reached: bool,
}

pub struct RunToolChatUseCase {
    gateway: Arc<dyn CompletionGateway>,
    registry: Arc<dyn CapabilityRegistryPort>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl Clone for RunToolChatUseCase {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            registry: self.registry.clone(),
            conversation_logger: self.conversation_logger.clone(),
        }
    }
}

impl RunToolChatUseCase {
    pub fn new(
        gateway: Arc<dyn CompletionGateway>,
        registry: Arc<dyn CapabilityRegistryPort>,
    ) -> Self {
        Self {
            gateway,
            registry,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub async fn execute(
        &self,
        input: RunToolChatInput,
    ) -> Result<RunToolChatOutput, RunToolChatError> {
        let mut messages = build_conversation(&input);
        if !messages.iter().any(|m| !m.is_system()) {
            return Err(RunToolChatError::EmptyConversation);
        }

        let tools = if input.use_tools {
            self.registry.tool_descriptors().await
        } else {
            Vec::new()
        };
        let max_rounds = input.execution.max_tool_rounds.clamp(1, MAX_TOOL_ROUNDS);

        info!(
            messages = messages.len(),
            tools = tools.len(),
            "Starting chat"
        );
        self.conversation_logger.log(ConversationEvent::new(
            "chat_request",
            serde_json::json!({
                "messages": messages.len(),
                "tools": tools.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            }),
        ));

        let request = |messages: &[ChatMessage]| {
            CompletionRequest::new(messages.to_vec())
                .with_tools(tools.clone())
                .with_max_tokens(input.execution.max_tokens)
                .with_temperature(input.execution.temperature)
        };

        let mut response = self.gateway.complete(&request(&messages)).await?;
        let mut last_text = response.text_content();
        let mut rounds = 0;
        let mut invocations = Vec::new();
        let mut round_limit_reached = false;

        loop {
            let tool_calls = response.tool_calls();
            if tool_calls.is_empty() {
                break;
            }
            if !input.use_tools {
                warn!(calls = tool_calls.len(), "Model requested tools that were not offered; ignoring");
                break;
            }
            if rounds >= max_rounds {
                warn!("Tool loop hit the round cap ({})", max_rounds);
                round_limit_reached = true;
                break;
            }
            rounds += 1;

            debug!(round = rounds, calls = tool_calls.len(), "Executing tool calls");
            messages.push(ChatMessage::assistant_with_tools(
                response.text_content(),
                tool_calls.clone(),
            ));

            let results = futures::future::join_all(
                tool_calls.iter().map(|call| self.run_tool_call(call)),
            )
            .await;

            for (call, (output, is_error)) in tool_calls.iter().zip(results) {
                invocations.push(ToolInvocation {
                    round: rounds,
                    name: call.name.clone(),
                    arguments: call.arguments.clone(),
                    is_error,
                    output_preview: output.chars().take(OUTPUT_PREVIEW_CHARS).collect(),
                });
                messages.push(ChatMessage::tool_result(&call.id, output, is_error));
            }

            response = self.gateway.complete(&request(&messages)).await?;
            let text = response.text_content();
            if !text.is_empty() {
                last_text = text;
            }
        }

        // Intermediate texts ("Let me check...") are dropped; the last one is the answer.
        let answer = last_text;
        if answer.is_empty() && !round_limit_reached {
            return Err(RunToolChatError::EmptyResponse);
        }

        info!(rounds, round_limit_reached, "Chat completed");
        self.conversation_logger.log(ConversationEvent::new(
            "chat_answer",
            serde_json::json!({
                "model": response.model,
                "rounds": rounds,
                "round_limit_reached": round_limit_reached,
                "bytes": answer.len(),
                "text": answer,
            }),
        ));

        Ok(RunToolChatOutput {
            answer,
            model: response.model,
            rounds,
            tool_invocations: invocations,
            round_limit_reached,
        })
    }

    /// Invoke one call, folding every failure into an error result.
    async fn run_tool_call(&self, call: &ToolCall) -> (String, bool) {
        self.conversation_logger.log(ConversationEvent::new(
            "tool_call",
            serde_json::json!({
                "id": call.id,
                "name": call.name,
                "arguments": call.arguments,
            }),
        ));

        let (output, is_error) = match self
            .registry
            .invoke(&call.name, call.arguments.clone())
            .await
        {
            Ok(result) => (result.text, result.is_error),
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Tool call failed");
                (format!("Error: {}", e), true)
            }
        };

        self.conversation_logger.log(ConversationEvent::new(
            "tool_result",
            serde_json::json!({
                "id": call.id,
                "name": call.name,
                "is_error": is_error,
                "bytes": output.len(),
            }),
        ));

        (output, is_error)
    }
}

/// Leading system message, then the caller's non-system messages.
///
/// Priority: explicit `system`, then a system message in the input, then
/// the configured prompt, then the built-in default.
fn build_conversation(input: &RunToolChatInput) -> Vec<ChatMessage> {
    let from_messages = input
        .messages
        .iter()
        .find(|m| m.is_system())
        .map(|m| m.content().to_string());

    let default_prompt = if input.use_tools {
        PromptTemplate::tool_chat_system()
    } else {
        PromptTemplate::chat_system()
    };

    let system = input
        .system
        .clone()
        .filter(|s| !s.trim().is_empty())
        .or(from_messages)
        .or_else(|| input.execution.system_prompt.clone())
        .unwrap_or_else(|| default_prompt.to_string());

    std::iter::once(ChatMessage::system(system))
        .chain(input.messages.iter().filter(|m| !m.is_system()).cloned())
        .collect()
}
