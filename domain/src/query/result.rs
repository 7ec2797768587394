//! Translation outcome value object

use serde::{Deserialize, Serialize};

/// Confidence for input that already was a query
pub const CONFIDENCE_PASSTHROUGH: f64 = 1.0;
/// Confidence for a pattern rule match
pub const CONFIDENCE_RULE: f64 = 0.9;
/// Confidence for the entity-keyword fallback
pub const CONFIDENCE_ENTITY_FALLBACK: f64 = 0.5;

/// Example inputs quoted in the help message of a failed translation.
pub const EXAMPLE_INPUTS: &[&str] = &[
    "show all accounts",
    "accounts in California",
    "contacts at Acme",
    "opportunities over $50k",
    "opportunities closing this quarter",
    "new leads",
    "open cases",
    "how many contacts",
];

/// Result of translating free text into SOQL.
///
/// Exactly one of `query` and `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    pub query: Option<String>,
    pub confidence: f64,
    pub raw_passthrough: bool,
    pub suggestion: Option<String>,
    pub error: Option<String>,
}

impl TranslationResult {
    pub fn passthrough(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            confidence: CONFIDENCE_PASSTHROUGH,
            raw_passthrough: true,
            suggestion: None,
            error: None,
        }
    }

    pub fn matched(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            confidence: CONFIDENCE_RULE,
            raw_passthrough: false,
            suggestion: None,
            error: None,
        }
    }

    pub fn partial(query: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            confidence: CONFIDENCE_ENTITY_FALLBACK,
            raw_passthrough: false,
            suggestion: Some(suggestion.into()),
            error: None,
        }
    }

    pub fn unmatched() -> Self {
        Self {
            query: None,
            confidence: 0.0,
            raw_passthrough: false,
            suggestion: None,
            error: Some(help_message()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.query.is_some()
    }
}

/// Fixed help text returned when nothing in the input was recognised.
pub fn help_message() -> String {
    let examples = EXAMPLE_INPUTS
        .iter()
        .map(|e| format!("\"{}\"", e))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Could not translate the request into a query. Try something like {}, \
         or write SOQL directly (e.g. SELECT Id, Name FROM Account LIMIT 10).",
        examples
    )
}
