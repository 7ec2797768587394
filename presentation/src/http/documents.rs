//! Document index handlers

use super::error::ApiError;
use super::state::AppState;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use toolbridge_application::{
    AskDocumentsOutput, AskDocumentsUseCase, IndexDocumentUseCase, IndexedDocument, UploadOutput,
};

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub filename: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct DocumentList {
    pub documents: Vec<IndexedDocument>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// `POST /api/documents`
pub async fn upload(
    State(state): State<AppState>,
    payload: Result<Json<UploadRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UploadOutput>), ApiError> {
    let Json(request) = payload?;
    let output = IndexDocumentUseCase::new(state.vendors.document_index()?)
        .upload(&request.filename, &request.content, &state.execution)
        .await?;
    Ok((StatusCode::CREATED, Json(output)))
}

/// `GET /api/documents`
pub async fn list(State(state): State<AppState>) -> Result<Json<DocumentList>, ApiError> {
    let documents = IndexDocumentUseCase::new(state.vendors.document_index()?)
        .list()
        .await?;
    Ok(Json(DocumentList { documents }))
}

/// `DELETE /api/documents/{filename}`
pub async fn delete(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    IndexDocumentUseCase::new(state.vendors.document_index()?)
        .delete(&filename)
        .await?;
    Ok(Json(DeleteResponse { deleted: filename }))
}

/// `POST /api/documents/ask`
pub async fn ask(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskDocumentsOutput>, ApiError> {
    let Json(request) = payload?;
    let use_case =
        AskDocumentsUseCase::new(state.vendors.document_index()?, state.vendors.completion()?);
    let output = use_case
        .execute(&request.question, request.top_k, &state.execution)
        .await?;
    Ok(Json(output))
}
