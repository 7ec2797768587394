//! Prompt domain
//!
//! Compiled-in templates for the chat, search-answer and document-answer flows.

mod template;

pub use template::PromptTemplate;
