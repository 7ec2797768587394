//! Natural-language query and Salesforce describe handlers

use super::error::ApiError;
use super::state::AppState;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use toolbridge_application::{ObjectDescription, QueryResult, RunNaturalQueryUseCase};
use toolbridge_domain::TranslationResult;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub text: String,
}

/// Translation fields followed by `totalSize`, `done` and `records`.
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    #[serde(flatten)]
    pub translation: TranslationResult,
    #[serde(flatten)]
    pub result: QueryResult,
}

/// Access token from an `Authorization: Bearer <token>` header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// `POST /api/query/translate`
pub async fn translate(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<TranslationResult>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(state.translator.translate(&request.text)))
}

/// `POST /api/query`
pub async fn run_query(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Json(request) = payload?;
    let store = state.vendors.record_store(bearer_token(&headers))?;
    let output = RunNaturalQueryUseCase::new(state.translator.clone(), store)
        .execute(&request.text)
        .await?;
    Ok(Json(QueryResponse {
        translation: output.translation,
        result: output.result,
    }))
}

/// `GET /api/salesforce/describe/{object}`
pub async fn describe(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(object): Path<String>,
) -> Result<Json<ObjectDescription>, ApiError> {
    let store = state.vendors.record_store(bearer_token(&headers))?;
    let description = RunNaturalQueryUseCase::new(state.translator.clone(), store)
        .describe(&object)
        .await?;
    Ok(Json(description))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc123")), Some("abc123"));
        assert_eq!(bearer_token(&headers("bearer  abc123 ")), Some("abc123"));
        assert_eq!(bearer_token(&headers("Basic dXNlcg==")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
