//! Incremental parser for the chat completions SSE stream.
//!
//! Network reads arrive as arbitrary byte slices that can split an event
//! anywhere, so the parser buffers until a full line is available. Only
//! `data:` lines matter; everything else (blank keep-alive lines, comments)
//! is ignored.

use docqa_core::LlmError;
use serde::Deserialize;

/// Tokens extracted from one network read, plus whether the terminator was
/// seen.
pub(crate) struct SsePush {
    pub tokens: Vec<String>,
    pub done: bool,
}

/// Line-buffering parser for `data:` events.
pub(crate) struct SseParser {
    buffer: Vec<u8>,
}

impl SseParser {
    pub(crate) fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Feed one network read and drain every complete line from the buffer.
    ///
    /// After `done` is true no further tokens are produced.
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Result<SsePush, LlmError> {
        self.buffer.extend_from_slice(bytes);

        let mut tokens = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line_bytes: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = std::str::from_utf8(&line_bytes)
                .map_err(|_| LlmError::Stream("invalid UTF-8 in event stream".to_string()))?
                .trim();

            let payload = match line.strip_prefix("data:") {
                Some(rest) => rest.trim_start(),
                None => continue,
            };

            if payload == "[DONE]" {
                return Ok(SsePush { tokens, done: true });
            }

            let chunk: StreamChunk = serde_json::from_str(payload)
                .map_err(|e| LlmError::Stream(format!("malformed stream chunk: {e}")))?;
            for choice in chunk.choices {
                if let Some(content) = choice.delta.content {
                    if !content.is_empty() {
                        tokens.push(content);
                    }
                }
            }
        }

        Ok(SsePush {
            tokens,
            done: false,
        })
    }
}

#[derive(Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Deserialize, Default)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}
