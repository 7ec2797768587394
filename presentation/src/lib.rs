//! Presentation layer for toolbridge
//!
//! This crate contains the CLI definition and the axum HTTP API.

pub mod cli;
pub mod http;

// Re-export commonly used types
pub use cli::commands::Cli;
pub use http::{ApiError, AppState, router};
