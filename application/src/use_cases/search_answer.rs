//! Search Answer use case.
//!
//! Runs a web search and, when asked, has the model answer the query from
//! the hits.

use crate::config::{DEFAULT_SEARCH_RESULTS, ExecutionParams, MAX_SEARCH_RESULTS};
use crate::ports::completion::{CompletionGateway, CompletionRequest, GatewayError};
use crate::ports::web_search::{SearchHit, WebSearchPort};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use toolbridge_domain::{ChatMessage, PromptTemplate};
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum SearchAnswerError {
    #[error("Search query is empty")]
    EmptyQuery,

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

#[derive(Debug, Clone)]
pub struct SearchAnswerInput {
    pub query: String,
    pub max_results: Option<usize>,
    pub summarize: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAnswerOutput {
    pub query: String,
    pub results: Vec<SearchHit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

pub struct SearchAnswerUseCase {
    search: Arc<dyn WebSearchPort>,
    /// Only needed when summarizing
    completion: Option<Arc<dyn CompletionGateway>>,
}

impl SearchAnswerUseCase {
    pub fn new(search: Arc<dyn WebSearchPort>) -> Self {
        Self {
            search,
            completion: None,
        }
    }

    pub fn with_completion(mut self, completion: Arc<dyn CompletionGateway>) -> Self {
        self.completion = Some(completion);
        self
    }

    pub async fn execute(
        &self,
        input: SearchAnswerInput,
        execution: &ExecutionParams,
    ) -> Result<SearchAnswerOutput, SearchAnswerError> {
        let query = input.query.trim().to_string();
        if query.is_empty() {
            return Err(SearchAnswerError::EmptyQuery);
        }
        let max_results = input
            .max_results
            .unwrap_or(DEFAULT_SEARCH_RESULTS)
            .clamp(1, MAX_SEARCH_RESULTS);

        let results = self.search.search(&query, max_results).await?;
        info!(hits = results.len(), "Web search completed");

        let answer = match (&self.completion, input.summarize) {
            (Some(completion), true) if !results.is_empty() => {
                Some(self.summarize(completion.as_ref(), &query, &results, execution).await?)
            }
            _ => None,
        };

        Ok(SearchAnswerOutput {
            query,
            results,
            answer,
        })
    }

    async fn summarize(
        &self,
        completion: &dyn CompletionGateway,
        query: &str,
        results: &[SearchHit],
        execution: &ExecutionParams,
    ) -> Result<String, GatewayError> {
        let triples: Vec<(String, String, String)> = results
            .iter()
            .map(|hit| (hit.title.clone(), hit.url.clone(), hit.content.clone()))
            .collect();

        let request = CompletionRequest::new(vec![
            ChatMessage::system(PromptTemplate::search_answer_system()),
            ChatMessage::user(PromptTemplate::search_answer_prompt(query, &triples)),
        ])
        .with_max_tokens(execution.max_tokens)
        .with_temperature(execution.temperature);

        debug!("Summarizing {} search results", results.len());
        let response = completion.complete(&request).await?;
        Ok(response.text_content())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use toolbridge_domain::LlmResponse;

    struct MockSearch {
        hits: Vec<SearchHit>,
        requested: Mutex<Option<usize>>,
    }

    impl MockSearch {
        fn new(count: usize) -> Self {
            Self {
                hits: (0..count)
                    .map(|i| SearchHit {
                        title: format!("Result {}", i),
                        url: format!("https://example.com/{}", i),
                        content: format!("content {}", i),
                        score: Some(0.9),
                    })
                    .collect(),
                requested: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl WebSearchPort for MockSearch {
        async fn search(
            &self,
            _query: &str,
            max_results: usize,
        ) -> Result<Vec<SearchHit>, GatewayError> {
            *self.requested.lock().unwrap() = Some(max_results);
            Ok(self.hits.iter().take(max_results).cloned().collect())
        }
    }

    struct MockCompletion {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CompletionGateway for MockCompletion {
        async fn complete(&self, request: &CompletionRequest) -> Result<LlmResponse, GatewayError> {
            let prompt = request
                .messages
                .last()
                .map(|m| m.content().to_string())
                .unwrap_or_default();
            self.prompts.lock().unwrap().push(prompt);
            Ok(LlmResponse::from_text("Summarized [1]"))
        }
    }

    fn input(query: &str, max_results: Option<usize>, summarize: bool) -> SearchAnswerInput {
        SearchAnswerInput {
            query: query.to_string(),
            max_results,
            summarize,
        }
    }

    #[tokio::test]
    async fn test_search_without_summary() {
        let search = Arc::new(MockSearch::new(3));
        let use_case = SearchAnswerUseCase::new(search.clone());

        let output = use_case
            .execute(input("rust async", None, false), &ExecutionParams::default())
            .await
            .unwrap();

        assert_eq!(output.results.len(), 3);
        assert!(output.answer.is_none());
        assert_eq!(*search.requested.lock().unwrap(), Some(DEFAULT_SEARCH_RESULTS));
    }

    #[tokio::test]
    async fn test_summary_is_grounded_on_hits() {
        let completion = Arc::new(MockCompletion {
            prompts: Mutex::new(Vec::new()),
        });
        let use_case =
            SearchAnswerUseCase::new(Arc::new(MockSearch::new(2))).with_completion(completion.clone());

        let output = use_case
            .execute(input("rust async", Some(2), true), &ExecutionParams::default())
            .await
            .unwrap();

        assert_eq!(output.answer.as_deref(), Some("Summarized [1]"));
        let prompts = completion.prompts.lock().unwrap();
        assert!(prompts[0].contains("[2] Result 1"));
    }

    #[tokio::test]
    async fn test_max_results_is_clamped() {
        let search = Arc::new(MockSearch::new(1));
        let use_case = SearchAnswerUseCase::new(search.clone());
        use_case
            .execute(input("q", Some(500), false), &ExecutionParams::default())
            .await
            .unwrap();
        assert_eq!(*search.requested.lock().unwrap(), Some(MAX_SEARCH_RESULTS));
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let use_case = SearchAnswerUseCase::new(Arc::new(MockSearch::new(1)));
        assert!(matches!(
            use_case
                .execute(input("  ", None, false), &ExecutionParams::default())
                .await,
            Err(SearchAnswerError::EmptyQuery)
        ));
    }
}
