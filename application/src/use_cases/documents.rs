//! Document use cases.
//!
//! [`IndexDocumentUseCase`] chunks and uploads documents and manages the
//! index listing. [`AskDocumentsUseCase`] answers a question from the
//! best-matching chunks.

use crate::config::{DEFAULT_TOP_K, ExecutionParams, MAX_TOP_K};
use crate::ports::completion::{CompletionGateway, CompletionRequest, GatewayError};
use crate::ports::document_index::{DocumentIndexPort, DocumentMatch, IndexedDocument};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use toolbridge_domain::document::validate_filename;
use toolbridge_domain::{ChatMessage, DomainError, PromptTemplate, chunk_text};
use tracing::info;

/// Answer returned when the index has nothing relevant.
pub const NO_MATCHES_ANSWER: &str = "No relevant documents were found for this question.";

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error(transparent)]
    InvalidInput(#[from] DomainError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutput {
    pub filename: String,
    pub chunks: usize,
}

pub struct IndexDocumentUseCase {
    index: Arc<dyn DocumentIndexPort>,
}

impl IndexDocumentUseCase {
    pub fn new(index: Arc<dyn DocumentIndexPort>) -> Self {
        Self { index }
    }

    pub async fn upload(
        &self,
        filename: &str,
        content: &str,
        execution: &ExecutionParams,
    ) -> Result<UploadOutput, DocumentError> {
        let filename = filename.trim();
        let chunks = chunk_text(
            filename,
            content,
            execution.chunk_size,
            execution.chunk_overlap,
        )?;

        self.index.upload(filename, &chunks).await?;
        info!(filename, chunks = chunks.len(), "Document indexed");

        Ok(UploadOutput {
            filename: filename.to_string(),
            chunks: chunks.len(),
        })
    }

    pub async fn list(&self) -> Result<Vec<IndexedDocument>, DocumentError> {
        Ok(self.index.list().await?)
    }

    pub async fn delete(&self, filename: &str) -> Result<(), DocumentError> {
        validate_filename(filename)?;
        self.index.delete(filename.trim()).await?;
        info!(filename, "Document deleted");
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskDocumentsOutput {
    pub answer: String,
    pub sources: Vec<DocumentMatch>,
}

pub struct AskDocumentsUseCase {
    index: Arc<dyn DocumentIndexPort>,
    completion: Arc<dyn CompletionGateway>,
}

impl AskDocumentsUseCase {
    pub fn new(index: Arc<dyn DocumentIndexPort>, completion: Arc<dyn CompletionGateway>) -> Self {
        Self { index, completion }
    }

    pub async fn execute(
        &self,
        question: &str,
        top_k: Option<usize>,
        execution: &ExecutionParams,
    ) -> Result<AskDocumentsOutput, DocumentError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(DomainError::EmptyInput("question").into());
        }
        let top_k = top_k.unwrap_or(DEFAULT_TOP_K).clamp(1, MAX_TOP_K);

        let sources = self.index.search(question, top_k).await?;
        if sources.is_empty() {
            return Ok(AskDocumentsOutput {
                answer: NO_MATCHES_ANSWER.to_string(),
                sources,
            });
        }

        let passages: Vec<(String, String)> = sources
            .iter()
            .map(|m| (m.filename.clone(), m.text.clone()))
            .collect();
        let request = CompletionRequest::new(vec![
            ChatMessage::system(PromptTemplate::document_answer_system()),
            ChatMessage::user(PromptTemplate::document_answer_prompt(question, &passages)),
        ])
        .with_max_tokens(execution.max_tokens)
        .with_temperature(execution.temperature);

        let response = self.completion.complete(&request).await?;
        info!(sources = sources.len(), "Document question answered");

        Ok(AskDocumentsOutput {
            answer: response.text_content(),
            sources,
        })
    }
}
