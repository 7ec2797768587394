//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid query rule pattern `{pattern}`: {reason}")]
    InvalidRule { pattern: String, reason: String },

    #[error("Invalid provider name `{0}`: use letters, digits, '-' or '_' and no '__'")]
    InvalidProviderName(String),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Empty input: {0}")]
    EmptyInput(&'static str),
}

impl DomainError {
    /// Check if this error was caused by caller input rather than a build-time table
    pub fn is_input_error(&self) -> bool {
        !matches!(self, DomainError::InvalidRule { .. })
    }
}
