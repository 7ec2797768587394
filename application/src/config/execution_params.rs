//! Execution parameters for use case loop control.
//!
//! [`ExecutionParams`] groups the knobs that shape a chat run and the
//! document/search flows. These are application-layer concerns, filled from
//! the `[chat]` config section.

use serde::{Deserialize, Serialize};
use toolbridge_domain::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};

/// Hard upper bound on tool rounds in one chat request.
pub const MAX_TOOL_ROUNDS: usize = 5;

/// Results requested from web search when the caller does not say.
pub const DEFAULT_SEARCH_RESULTS: usize = 5;
/// Upper bound on requested web search results.
pub const MAX_SEARCH_RESULTS: usize = 20;

/// Chunks retrieved for a document question when the caller does not say.
pub const DEFAULT_TOP_K: usize = 5;
/// Upper bound on retrieved chunks.
pub const MAX_TOP_K: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Tool rounds allowed per chat request, at most [`MAX_TOOL_ROUNDS`].
    pub max_tool_rounds: usize,
    /// System prompt used when a request carries none.
    pub system_prompt: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            max_tool_rounds: MAX_TOOL_ROUNDS,
            system_prompt: None,
            max_tokens: None,
            temperature: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    /// Clamped to `1..=MAX_TOOL_ROUNDS`.
    pub fn with_max_tool_rounds(mut self, max: usize) -> Self {
        self.max_tool_rounds = max.clamp(1, MAX_TOOL_ROUNDS);
        self
    }

    pub fn with_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt.filter(|p| !p.trim().is_empty());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }
}
