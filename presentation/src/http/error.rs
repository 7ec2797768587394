//! HTTP error mapping
//!
//! Every handler returns `Result<_, ApiError>`. The response body is always
//! `{"error": "<message>", "kind": "<kind>"}`, with a few extra fields for
//! failed translations and upstream statuses.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use thiserror::Error;
use toolbridge_application::{
    ConfigError, DocumentError, GatewayError, RegistryError, RunNaturalQueryError,
    RunToolChatError, SearchAnswerError,
};
use toolbridge_domain::{DomainError, TranslationResult};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{}", .0.error.as_deref().unwrap_or("Could not translate the request"))]
    Untranslatable(TranslationResult),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Untranslatable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Gateway(e) => match e {
                GatewayError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                GatewayError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_GATEWAY,
            },
            ApiError::Registry(e) => match e {
                RegistryError::InvalidProvider(_) => StatusCode::BAD_REQUEST,
                RegistryError::UnknownCapability(_) => StatusCode::NOT_FOUND,
                RegistryError::ProviderNotConnected(_) => StatusCode::SERVICE_UNAVAILABLE,
                RegistryError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                RegistryError::RegistrationFailed { .. }
                | RegistryError::InvocationFailed { .. } => StatusCode::BAD_GATEWAY,
            },
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "invalid_input",
            ApiError::Untranslatable(_) => "translation",
            ApiError::Config(_) => "config",
            ApiError::Gateway(e) => match e {
                GatewayError::Timeout => "timeout",
                GatewayError::Upstream { .. } => "upstream",
                GatewayError::ConnectionError(_) => "connection",
                GatewayError::InvalidResponse(_) => "invalid_response",
                GatewayError::Other(_) => "internal",
            },
            ApiError::Registry(e) => match e {
                RegistryError::InvalidProvider(_) => "invalid_input",
                RegistryError::RegistrationFailed { .. } => "registration",
                RegistryError::UnknownCapability(_) => "not_found",
                RegistryError::ProviderNotConnected(_) => "not_connected",
                RegistryError::Timeout { .. } => "timeout",
                RegistryError::InvocationFailed { .. } => "invocation",
            },
        }
    }

    fn body(&self) -> Value {
        let mut body = json!({ "error": self.to_string(), "kind": self.kind() });
        match self {
            ApiError::Untranslatable(translation) => {
                body["translation"] = json!(translation);
            }
            ApiError::Gateway(GatewayError::Upstream { status, .. }) => {
                body["upstreamStatus"] = json!(status);
            }
            _ => {}
        }
        body
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), kind = self.kind(), "{}", self);
        } else {
            tracing::debug!(status = status.as_u16(), kind = self.kind(), "{}", self);
        }
        (status, Json(self.body())).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<RunNaturalQueryError> for ApiError {
    fn from(e: RunNaturalQueryError) -> Self {
        match e {
            RunNaturalQueryError::Untranslatable(translation) => {
                ApiError::Untranslatable(translation)
            }
            RunNaturalQueryError::EmptyObject => ApiError::BadRequest(e.to_string()),
            RunNaturalQueryError::Gateway(e) => ApiError::Gateway(e),
        }
    }
}

impl From<RunToolChatError> for ApiError {
    fn from(e: RunToolChatError) -> Self {
        match e {
            RunToolChatError::EmptyConversation => ApiError::BadRequest(e.to_string()),
            RunToolChatError::GatewayError(e) => ApiError::Gateway(e),
            RunToolChatError::EmptyResponse => {
                ApiError::Gateway(GatewayError::InvalidResponse(e.to_string()))
            }
        }
    }
}

impl From<SearchAnswerError> for ApiError {
    fn from(e: SearchAnswerError) -> Self {
        match e {
            SearchAnswerError::EmptyQuery => ApiError::BadRequest(e.to_string()),
            SearchAnswerError::Gateway(e) => ApiError::Gateway(e),
        }
    }
}

impl From<DocumentError> for ApiError {
    fn from(e: DocumentError) -> Self {
        match e {
            DocumentError::InvalidInput(e) => e.into(),
            DocumentError::Gateway(e) => ApiError::Gateway(e),
        }
    }
}
