//! Conversation messages

use serde::{Deserialize, Serialize};

/// A tool invocation proposed by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// API-assigned correlation id
    pub id: String,
    /// Qualified capability name
    pub name: String,
    #[serde(default = "empty_arguments")]
    pub arguments: serde_json::Value,
}

fn empty_arguments() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }
}

/// A message in a chat conversation.
///
/// Serialized with a `role` tag, so clients send
/// `{"role": "user", "content": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ChatMessage {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        #[serde(default)]
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    /// Result of one tool call, fed back to the model.
    Tool {
        tool_call_id: String,
        content: String,
        #[serde(default)]
        is_error: bool,
    },
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage::User {
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage::Assistant {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn assistant_with_tools(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        ChatMessage::Assistant {
            content: content.into(),
            tool_calls,
        }
    }

    pub fn tool_result(
        tool_call_id: impl Into<String>,
        content: impl Into<String>,
        is_error: bool,
    ) -> Self {
        ChatMessage::Tool {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
            is_error,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            ChatMessage::System { content }
            | ChatMessage::User { content }
            | ChatMessage::Assistant { content, .. }
            | ChatMessage::Tool { content, .. } => content,
        }
    }

    pub fn is_system(&self) -> bool {
        matches!(self, ChatMessage::System { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_client_messages() {
        let messages: Vec<ChatMessage> = serde_json::from_value(serde_json::json!([
            {"role": "system", "content": "be brief"},
            {"role": "user", "content": "hi"},
            {"role": "assistant", "content": "hello"}
        ]))
        .unwrap();
        assert_eq!(messages[0], ChatMessage::system("be brief"));
        assert_eq!(messages[1], ChatMessage::user("hi"));
        assert_eq!(messages[2], ChatMessage::assistant("hello"));
    }

    #[test]
    fn test_tool_result_roundtrip_fields() {
        let json = serde_json::to_value(ChatMessage::tool_result("call_1", "boom", true)).unwrap();
        assert_eq!(json["role"], "tool");
        assert_eq!(json["tool_call_id"], "call_1");
        assert_eq!(json["is_error"], true);
    }

    #[test]
    fn test_assistant_without_tools_omits_field() {
        let json = serde_json::to_value(ChatMessage::assistant("done")).unwrap();
        assert!(json.get("tool_calls").is_none());
    }

    #[test]
    fn test_tool_call_defaults_arguments() {
        let call: ToolCall =
            serde_json::from_value(serde_json::json!({"id": "1", "name": "a__b"})).unwrap();
        assert!(call.arguments.as_object().unwrap().is_empty());
        assert_eq!(call.get_string("missing"), None);
    }
}
