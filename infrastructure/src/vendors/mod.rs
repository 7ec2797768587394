//! HTTP adapters for the external vendor APIs.
//!
//! Each adapter owns a `reqwest::Client` and maps transport failures and
//! non-2xx responses into [`GatewayError`].

pub mod completion;
pub mod index;
pub mod salesforce;
pub mod search;

pub use completion::OpenAiCompletionGateway;
pub use index::HttpDocumentIndex;
pub use salesforce::SalesforceRecordStore;
pub use search::TavilySearch;

use reqwest::Response;
use serde::de::DeserializeOwned;
use std::time::Duration;
use toolbridge_application::GatewayError;

const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .unwrap_or_default()
}

pub(crate) fn transport_error(operation: &'static str, error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::ConnectionError(format!("{}: {}", operation, error))
    }
}

/// Pass a 2xx response through; otherwise build an `Upstream` error.
pub(crate) async fn check_status(
    operation: &'static str,
    response: Response,
) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(GatewayError::upstream(
        operation,
        status.as_u16(),
        vendor_message(&body),
    ))
}

pub(crate) async fn read_json<T: DeserializeOwned>(
    operation: &'static str,
    response: Response,
) -> Result<T, GatewayError> {
    response
        .json()
        .await
        .map_err(|e| GatewayError::InvalidResponse(format!("{}: {}", operation, e)))
}

/// Extract a human-readable message from a vendor error body.
///
/// Understands `[{"message": ..}]` (Salesforce), `{"error": {"message": ..}}`
/// (OpenAI), `{"error": ".."}`, `{"message": ..}` and `{"detail": ..}`.
/// A non-JSON body is used as-is.
pub(crate) fn vendor_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        return Some(body.to_string());
    };

    let message = match &json {
        serde_json::Value::Array(items) => items.first().and_then(|i| i.get("message")),
        serde_json::Value::Object(map) => map
            .get("error")
            .and_then(|e| if e.is_object() { e.get("message") } else { Some(e) })
            .or_else(|| map.get("message"))
            .or_else(|| map.get("detail")),
        _ => None,
    };

    message
        .and_then(|m| m.as_str())
        .map(|m| m.to_string())
        .filter(|m| !m.trim().is_empty())
}
