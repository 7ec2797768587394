use super::error::ApiError;
use super::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Deserialize;
use toolbridge_application::{SearchAnswerInput, SearchAnswerOutput, SearchAnswerUseCase};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub max_results: Option<usize>,
    #[serde(default)]
    pub summarize: bool,
}

/// `POST /api/search`
///
/// The completion gateway is only resolved when a summary is requested.
pub async fn search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchAnswerOutput>, ApiError> {
    let Json(request) = payload?;
    let mut use_case = SearchAnswerUseCase::new(state.vendors.web_search()?);
    if request.summarize {
        use_case = use_case.with_completion(state.vendors.completion()?);
    }

    let input = SearchAnswerInput {
        query: request.query,
        max_results: request.max_results,
        summarize: request.summarize,
    };
    Ok(Json(use_case.execute(input, &state.execution).await?))
}
