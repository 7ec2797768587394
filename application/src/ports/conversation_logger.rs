//! Port for structured conversation logging.
//!
//! Records chat requests, tool calls, tool results and answers to a
//! machine-readable transcript. This is separate from `tracing`: tracing
//! carries diagnostics, this port carries the conversation itself.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// A structured conversation event.
pub struct ConversationEvent {
    /// Event type identifier (e.g. "chat_request", "tool_call", "chat_answer").
    pub event_type: &'static str,
    pub timestamp: DateTime<Utc>,
    /// Event-specific fields.
    pub payload: Value,
}

impl ConversationEvent {
    /// Create a new event stamped with the current UTC time.
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            timestamp: Utc::now(),
            payload,
        }
    }
}

/// Port for logging conversation events.
///
/// `log` is synchronous and infallible; implementations swallow write errors
/// so logging never fails a request.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
