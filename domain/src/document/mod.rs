//! Document domain
//!
//! Uploaded documents are split into overlapping character windows before
//! they are sent to the index, so that a fact straddling a boundary still
//! appears whole in at least one chunk.

use serde::{Deserialize, Serialize};

use crate::core::error::DomainError;

/// Maximum characters per chunk
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
/// Characters shared between consecutive chunks
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// One indexed slice of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub filename: String,
    /// Position of the chunk within the document, starting at 0
    pub index: usize,
    pub text: String,
}

/// Reject names that could escape a per-namespace listing.
pub fn validate_filename(filename: &str) -> Result<(), DomainError> {
    let trimmed = filename.trim();
    if trimmed.is_empty()
        || trimmed.contains('/')
        || trimmed.contains('\\')
        || trimmed == "."
        || trimmed == ".."
    {
        return Err(DomainError::InvalidFilename(filename.to_string()));
    }
    Ok(())
}

/// Split `text` into windows of at most `max_chars` characters, each
/// starting `max_chars - overlap` characters after the previous one.
///
/// A window is shortened to end after the last whitespace in its second
/// half when there is one, so words are rarely cut. Whitespace-only text
/// produces no chunks.
pub fn chunk_text(
    filename: &str,
    text: &str,
    max_chars: usize,
    overlap: usize,
) -> Result<Vec<DocumentChunk>, DomainError> {
    validate_filename(filename)?;
    if text.trim().is_empty() {
        return Err(DomainError::EmptyInput("document content"));
    }

    let max_chars = max_chars.max(1);
    let overlap = overlap.min(max_chars - 1);
    let chars: Vec<char> = text.chars().collect();

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let hard_end = (start + max_chars).min(chars.len());
        let end = if hard_end == chars.len() {
            hard_end
        } else {
            let floor = start + max_chars / 2;
            (floor..hard_end)
                .rev()
                .find(|&i| chars[i].is_whitespace())
                .map(|i| i + 1)
                .unwrap_or(hard_end)
        };

        let piece: String = chars[start..end].iter().collect();
        if !piece.trim().is_empty() {
            chunks.push(DocumentChunk {
                filename: filename.to_string(),
                index: chunks.len(),
                text: piece,
            });
        }

        if end == chars.len() {
            break;
        }
        // Always advance, even if the overlap would reach back past `start`.
        start = end.saturating_sub(overlap).max(start + 1);
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = chunk_text("notes.txt", "hello world", 1000, 200).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "hello world");
        assert_eq!(chunks[0].index, 0);
    }

    #[test]
    fn chunks_respect_size_and_overlap() {
        let text = "word ".repeat(600);
        let chunks = chunk_text("big.txt", &text, 1000, 200).unwrap();
        assert!(chunks.len() >= 3);
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 1000);
        }
        for pair in chunks.windows(2) {
            let tail: String = pair[0].text.chars().rev().take(50).collect::<Vec<_>>().into_iter().rev().collect();
            assert!(pair[1].text.contains(tail.trim()));
        }
        let indexes: Vec<_> = chunks.iter().map(|c| c.index).collect();
        assert_eq!(indexes, (0..chunks.len()).collect::<Vec<_>>());
    }

    #[test]
    fn text_without_whitespace_is_cut_hard() {
        let text = "x".repeat(2500);
        let chunks = chunk_text("blob.txt", &text, 1000, 200).unwrap();
        assert_eq!(chunks[0].text.len(), 1000);
        assert_eq!(chunks[1].text.len(), 1000);
        assert_eq!(chunks.last().unwrap().text.len(), 2500 - 1600);
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let text = "é".repeat(1500);
        let chunks = chunk_text("accents.txt", &text, 1000, 200).unwrap();
        assert_eq!(chunks[0].text.chars().count(), 1000);
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn overlap_larger_than_window_still_advances() {
        let chunks = chunk_text("a.txt", "abcdef", 2, 10).unwrap();
        assert_eq!(chunks.len(), 5);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            chunk_text("../etc/passwd", "x", 10, 2),
            Err(DomainError::InvalidFilename(_))
        ));
        assert!(matches!(
            chunk_text("", "x", 10, 2),
            Err(DomainError::InvalidFilename(_))
        ));
        assert!(matches!(
            chunk_text("a.txt", "  \n ", 10, 2),
            Err(DomainError::EmptyInput(_))
        ));
    }
}
