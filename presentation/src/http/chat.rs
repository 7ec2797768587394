use super::error::ApiError;
use super::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Deserialize;
use toolbridge_application::{RunToolChatInput, RunToolChatOutput, RunToolChatUseCase};
use toolbridge_domain::ChatMessage;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub system: Option<String>,
    /// Offer registered capabilities to the model; off unless asked for.
    #[serde(default)]
    pub use_tools: bool,
}

/// `POST /api/chat`
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<RunToolChatOutput>, ApiError> {
    let Json(request) = payload?;
    let use_case = RunToolChatUseCase::new(state.vendors.completion()?, state.registry.clone())
        .with_conversation_logger(state.conversation_logger.clone());

    let input = RunToolChatInput::new(request.messages, state.execution.as_ref().clone())
        .with_system(request.system)
        .with_tools(request.use_tools);
    Ok(Json(use_case.execute(input).await?))
}
