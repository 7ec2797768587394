//! Newline-delimited JSON framing.
//!
//! Provider stdout is a byte stream carrying one JSON message per line.
//! [`LineFramer`] turns arbitrary read chunks into complete messages.

use serde::Serialize;
use tracing::warn;

/// Accumulates bytes and yields one JSON value per complete line.
///
/// A trailing fragment without `\n` is kept until more bytes arrive.
/// Blank lines are skipped; lines that are not valid JSON are logged and
/// dropped without affecting later lines.
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `bytes` and return every message completed by them.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<serde_json::Value> {
        self.buffer.extend_from_slice(bytes);

        let mut messages = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = trim_ascii(&line[..line.len() - 1]);
            if line.is_empty() {
                continue;
            }
            match serde_json::from_slice(line) {
                Ok(value) => messages.push(value),
                Err(e) => warn!(
                    "Dropping malformed frame: {} ({})",
                    String::from_utf8_lossy(line),
                    e
                ),
            }
        }
        messages
    }

    /// Bytes of an incomplete trailing line.
    pub fn pending_bytes(&self) -> usize {
        self.buffer.len()
    }
}

fn trim_ascii(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}

/// Serialize `message` as one newline-terminated line.
pub fn encode_line<T: Serialize>(message: &T) -> serde_json::Result<Vec<u8>> {
    let mut line = serde_json::to_vec(message)?;
    line.push(b'\n');
    Ok(line)
}

/// Numeric correlation id of a message, if any.
pub fn message_id(json: &serde_json::Value) -> Option<u64> {
    json.get("id").and_then(|v| v.as_u64())
}

/// Method name, present on notifications and provider-initiated requests.
pub fn message_method(json: &serde_json::Value) -> Option<&str> {
    json.get("method").and_then(|v| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_complete_lines() {
        let mut framer = LineFramer::new();
        let messages = framer.push(b"{\"id\":1}\n{\"id\":2}\n");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1]["id"], 2);
        assert_eq!(framer.pending_bytes(), 0);
    }

    #[test]
    fn keeps_trailing_fragment() {
        let mut framer = LineFramer::new();
        assert!(framer.push(b"{\"id\":").is_empty());
        assert!(framer.pending_bytes() > 0);
        let messages = framer.push(b"3,\"result\":{}}\r\n");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["id"], 3);
    }

    #[test]
    fn blank_and_malformed_lines_do_not_block_later_frames() {
        let mut framer = LineFramer::new();
        let messages = framer.push(b"\n   \nnot json\n{\"id\":4}\n");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["id"], 4);
    }

    #[test]
    fn encode_line_appends_newline() {
        let line = encode_line(&serde_json::json!({"a": 1})).unwrap();
        assert_eq!(line.last(), Some(&b'\n'));
        assert_eq!(line.iter().filter(|&&b| b == b'\n').count(), 1);
    }

    #[test]
    fn id_and_method_accessors() {
        let response = serde_json::json!({"id": 1, "result": {}});
        assert_eq!(message_id(&response), Some(1));
        assert_eq!(message_method(&response), None);

        let notification = serde_json::json!({"method": "notifications/message"});
        assert_eq!(message_id(&notification), None);
        assert_eq!(message_method(&notification), Some("notifications/message"));

        assert_eq!(message_id(&serde_json::json!({"id": "abc"})), None);
    }
}
