//! Use cases (application services)

pub mod documents;
pub mod run_natural_query;
pub mod run_tool_chat;
pub mod search_answer;
