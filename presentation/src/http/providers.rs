//! Provider registry and tool invocation handlers

use super::error::ApiError;
use super::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use toolbridge_domain::{Capability, CapabilityOutput, ProviderSpec, ProviderStatus, ToolDescriptor};
use tracing::info;

#[derive(Debug, Serialize)]
pub struct ProvidersResponse {
    pub providers: BTreeMap<String, ProviderStatus>,
}

#[derive(Debug, Serialize)]
pub struct RegisteredResponse {
    pub provider: String,
    pub capabilities: Vec<Capability>,
}

#[derive(Debug, Serialize)]
pub struct ToolsResponse {
    pub tools: Vec<ToolDescriptor>,
}

#[derive(Debug, Deserialize)]
pub struct CallRequest {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<serde_json::Value>,
}

/// `GET /api/providers`
pub async fn status(State(state): State<AppState>) -> Json<ProvidersResponse> {
    Json(ProvidersResponse {
        providers: state.registry.status().await,
    })
}

/// `POST /api/providers`
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<ProviderSpec>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisteredResponse>), ApiError> {
    let Json(spec) = payload?;
    let provider = spec.name.clone();
    let capabilities = state.registry.register_provider(spec).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisteredResponse {
            provider,
            capabilities,
        }),
    ))
}

/// `DELETE /api/providers`
pub async fn teardown(State(state): State<AppState>) -> StatusCode {
    state.registry.teardown_all().await;
    info!("All providers torn down on request");
    StatusCode::NO_CONTENT
}

/// `GET /api/tools`
pub async fn tools(State(state): State<AppState>) -> Json<ToolsResponse> {
    Json(ToolsResponse {
        tools: state.registry.tool_descriptors().await,
    })
}

/// `POST /api/tools/call`
pub async fn call(
    State(state): State<AppState>,
    payload: Result<Json<CallRequest>, JsonRejection>,
) -> Result<Json<CapabilityOutput>, ApiError> {
    let Json(request) = payload?;
    let arguments = request
        .arguments
        .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));
    Ok(Json(state.registry.invoke(&request.name, arguments).await?))
}
