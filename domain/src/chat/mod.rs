//! Chat domain
//!
//! Messages exchanged with a completion API and the structured responses it
//! returns, including tool-use requests.

pub mod message;
pub mod response;

pub use message::{ChatMessage, ToolCall};
pub use response::{ContentBlock, LlmResponse, StopReason};
