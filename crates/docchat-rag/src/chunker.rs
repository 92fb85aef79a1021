//! Character-window text chunking with overlap.
//!
//! Chunks are sized in characters, not bytes, so multi-byte text never
//! splits inside a code point. Window ends prefer a whitespace boundary so
//! words stay intact where possible.

use docchat_core::error::DocChatError;

/// Split `text` into overlapping chunks of at most `chunk_size` characters.
///
/// Consecutive chunks share `overlap` characters of context. The end of each
/// window is pulled back to the nearest whitespace when one exists late
/// enough in the window to keep forward progress. Whitespace-only chunks are
/// dropped.
pub fn chunk_text(
    text: &str,
    chunk_size: usize,
    overlap: usize,
) -> Result<Vec<String>, DocChatError> {
    if chunk_size == 0 {
        return Err(DocChatError::Config(
            "chunk_size must be greater than zero".to_string(),
        ));
    }
    if overlap >= chunk_size {
        return Err(DocChatError::Config(format!(
            "chunk_overlap ({}) must be smaller than chunk_size ({})",
            overlap, chunk_size
        )));
    }

    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let hard_end = (start + chunk_size).min(chars.len());
        let end = if hard_end < chars.len() {
            // Prefer a whitespace boundary, but never one so early that the
            // next window would fail to advance.
            let floor = start + overlap + 1;
            match (floor..hard_end).rev().find(|&i| chars[i].is_whitespace()) {
                Some(ws) => ws,
                None => hard_end,
            }
        } else {
            hard_end
        };

        let chunk: String = chars[start..end].iter().collect();
        let trimmed = chunk.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }

        if end == chars.len() {
            break;
        }
        start = end - overlap;
    }

    Ok(chunks)
}
