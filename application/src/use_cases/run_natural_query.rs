//! Run Natural Query use case.
//!
//! Translates free text into SOQL and runs it against the record store.

use crate::ports::completion::GatewayError;
use crate::ports::record_store::{ObjectDescription, QueryResult, RecordStorePort};
use std::sync::Arc;
use thiserror::Error;
use toolbridge_domain::{QueryTranslator, TranslationResult};
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum RunNaturalQueryError {
    /// Nothing in the input was recognised; carries the full translation.
    #[error("{}", .0.error.as_deref().unwrap_or("Could not translate the request"))]
    Untranslatable(TranslationResult),

    #[error("Empty object name")]
    EmptyObject,

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Translation plus the rows it produced.
#[derive(Debug, Clone)]
pub struct NaturalQueryOutput {
    pub translation: TranslationResult,
    pub result: QueryResult,
}

pub struct RunNaturalQueryUseCase {
    translator: Arc<QueryTranslator>,
    store: Arc<dyn RecordStorePort>,
}

impl RunNaturalQueryUseCase {
    pub fn new(translator: Arc<QueryTranslator>, store: Arc<dyn RecordStorePort>) -> Self {
        Self { translator, store }
    }

    pub async fn execute(&self, text: &str) -> Result<NaturalQueryOutput, RunNaturalQueryError> {
        let translation = self.translator.translate(text);
        let Some(soql) = translation.query.clone() else {
            return Err(RunNaturalQueryError::Untranslatable(translation));
        };

        debug!(confidence = translation.confidence, soql = %soql, "Running translated query");
        let result = self.store.query(&soql).await?;
        info!(total_size = result.total_size, "Query completed");

        Ok(NaturalQueryOutput {
            translation,
            result,
        })
    }

    pub async fn describe(&self, object: &str) -> Result<ObjectDescription, RunNaturalQueryError> {
        let object = object.trim();
        if object.is_empty() {
            return Err(RunNaturalQueryError::EmptyObject);
        }
        Ok(self.store.describe(object).await?)
    }
}
