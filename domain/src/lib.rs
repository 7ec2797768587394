//! Domain layer for toolbridge
//!
//! This crate contains the core logic and value types. It performs no I/O
//! and has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Query translation
//!
//! [`QueryTranslator`] maps free-text requests onto SOQL through an ordered
//! table of pattern rules, falling back to a basic listing when only an
//! object name is recognised.
//!
//! ## Capabilities
//!
//! Local tool providers advertise [`Capability`] records. Each one is known
//! to the rest of the system by its qualified name `provider__local`.
//!
//! ## Chat
//!
//! [`ChatMessage`] and [`LlmResponse`] model a tool-calling conversation
//! with a completion API.

pub mod capability;
pub mod chat;
pub mod core;
pub mod document;
pub mod prompt;
pub mod query;

// Re-export commonly used types
pub use capability::{
    Capability, CapabilityOutput, ProviderSpec, ProviderStatus, ToolDescriptor, qualified_name,
};
pub use chat::{ChatMessage, ContentBlock, LlmResponse, StopReason, ToolCall};
pub use core::error::DomainError;
pub use document::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DocumentChunk, chunk_text};
pub use prompt::PromptTemplate;
pub use query::{EntityType, QueryRule, QueryTemplate, QueryTranslator, TranslationResult};
