//! Recursive character chunking.
//!
//! Splits text at the coarsest boundary that produces pieces within the size
//! limit: paragraph breaks first, then line breaks, sentence ends, spaces,
//! and finally raw character windows for text with no separators at all.
//! Adjacent chunks share a configurable overlap so sentences cut at a chunk
//! boundary remain retrievable from both sides.
//!
//! All sizes are in characters, never bytes, so multi-byte text is split at
//! valid boundaries.

use async_trait::async_trait;
use docqa_core::{ChunkConfig, Chunker};
use tracing::debug;

/// Boundary candidates, coarsest first. The empty string is the terminal
/// fallback and means "split anywhere".
const SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

/// Splits text into overlapping chunks at natural boundaries.
pub struct RecursiveChunker {
    config: ChunkConfig,
}

impl RecursiveChunker {
    /// Create a chunker with the given size parameters.
    #[must_use]
    pub fn new(config: ChunkConfig) -> Self {
        Self { config }
    }

    /// Split `text` into chunks.
    ///
    /// Every chunk is a contiguous substring of the input (modulo leading and
    /// trailing whitespace) and at most `chunk_size` characters long. Empty
    /// or whitespace-only input yields no chunks.
    #[must_use]
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mut chunks = Vec::new();
        self.split_with(text, &SEPARATORS, &mut chunks);
        debug!(
            "chunked {} chars into {} chunks",
            text.chars().count(),
            chunks.len()
        );
        chunks
    }

    fn split_with(&self, text: &str, separators: &[&str], out: &mut Vec<String>) {
        let (sep, rest) = match pick_separator(text, separators) {
            Some(found) => found,
            None => {
                self.window_split(text, out);
                return;
            }
        };

        let size = self.config.chunk_size.max(1);
        let mut pending: Vec<&str> = Vec::new();
        for piece in text.split(sep) {
            if piece.chars().count() > size {
                // Flush what fits, then descend to a finer boundary for the
                // oversized piece
                self.merge_pieces(&pending, sep, out);
                pending.clear();
                self.split_with(piece, rest, out);
            } else {
                pending.push(piece);
            }
        }
        self.merge_pieces(&pending, sep, out);
    }

    /// Join pieces with `sep` into chunks of at most `chunk_size` characters,
    /// carrying an overlap tail from each flushed chunk into the next.
    fn merge_pieces(&self, pieces: &[&str], sep: &str, out: &mut Vec<String>) {
        let size = self.config.chunk_size.max(1);
        let sep_len = sep.chars().count();

        let mut current = String::new();
        let mut current_len = 0usize;

        for piece in pieces {
            let piece_len = piece.chars().count();
            if piece_len == 0 {
                continue;
            }

            if current_len > 0 && current_len + sep_len + piece_len > size {
                // The tail is shortened if a full overlap would push the next
                // chunk past the size limit
                let budget = size.saturating_sub(piece_len + sep_len);
                let keep = self.config.overlap.min(budget);
                let tail = tail_chars(&current, keep).to_string();

                push_chunk(std::mem::take(&mut current), out);
                current_len = tail.chars().count();
                current = tail;
            }

            if !current.is_empty() {
                current.push_str(sep);
                current_len += sep_len;
            }
            current.push_str(piece);
            current_len += piece_len;
        }

        push_chunk(current, out);
    }

    /// Last resort for text with no usable separators: fixed-size character
    /// windows advancing by `chunk_size - overlap`.
    fn window_split(&self, text: &str, out: &mut Vec<String>) {
        let chars: Vec<char> = text.chars().collect();
        let size = self.config.chunk_size.max(1);
        let step = size.saturating_sub(self.config.overlap).max(1);

        let mut start = 0;
        while start < chars.len() {
            let end = (start + size).min(chars.len());
            push_chunk(chars[start..end].iter().collect(), out);
            if end == chars.len() {
                break;
            }
            start += step;
        }
    }
}

impl Default for RecursiveChunker {
    fn default() -> Self {
        Self::new(ChunkConfig::default())
    }
}

#[async_trait]
impl Chunker for RecursiveChunker {
    fn name(&self) -> &str {
        "recursive"
    }

    async fn split(&self, text: &str) -> Vec<String> {
        RecursiveChunker::split(self, text)
    }
}

/// First separator that actually occurs in `text`, with the finer separators
/// that follow it. `None` means fall through to character windows.
fn pick_separator<'a>(
    text: &str,
    separators: &'a [&'a str],
) -> Option<(&'a str, &'a [&'a str])> {
    for (i, sep) in separators.iter().enumerate() {
        if sep.is_empty() {
            return None;
        }
        if text.contains(sep) {
            return Some((sep, &separators[i + 1..]));
        }
    }
    None
}

/// Suffix of `s` containing at most `n` characters, split at a char boundary.
fn tail_chars(s: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    let total = s.chars().count();
    if total <= n {
        return s;
    }
    s.char_indices()
        .nth(total - n)
        .map(|(idx, _)| &s[idx..])
        .unwrap_or(s)
}

fn push_chunk(chunk: String, out: &mut Vec<String>) {
    let trimmed = chunk.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}
