//! Sentence-respecting chunker.
//!
//! Text is cut into sentence-like units at every run of whitespace that
//! follows `.`, `!`, `?` or a newline. Units are packed greedily into chunks
//! of roughly `chunk_size` characters. A unit is never split, so a single
//! sentence longer than the target becomes one oversized chunk.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Error, Result};

pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// A passage produced by the chunker, before keywords or ids are attached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextChunk {
    pub content: String,
    pub position: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Target chunk length in characters.
    pub chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: DEFAULT_CHUNK_SIZE }
    }
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidArgument("chunk size must be greater than zero".into()));
        }
        Ok(Self { chunk_size })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    /// Split `text` into ordered chunks with contiguous positions from 0.
    /// Chunk contents are trimmed and never empty.
    pub fn chunk(&self, text: &str) -> Vec<TextChunk> {
        let normalized = text.replace("\r\n", "\n");
        let mut chunks = Vec::new();
        let mut buffer = String::new();
        let mut buffer_len = 0usize;

        for unit in sentence_units(&normalized) {
            let unit_len = unit.chars().count();
            if buffer_len + unit_len > self.config.chunk_size && buffer_len > 0 {
                flush(&mut buffer, &mut chunks);
                buffer_len = 0;
            }
            buffer.push_str(unit);
            buffer.push(' ');
            buffer_len += unit_len + 1;
        }
        flush(&mut buffer, &mut chunks);

        trace!(bytes = normalized.len(), chunks = chunks.len(), "chunked text");
        chunks
    }
}

/// Convenience wrapper around [`Chunker::chunk`].
pub fn chunk_text(text: &str, chunk_size: usize) -> Vec<TextChunk> {
    Chunker::new(ChunkingConfig { chunk_size }).chunk(text)
}

fn flush(buffer: &mut String, chunks: &mut Vec<TextChunk>) {
    let content = buffer.trim();
    // A buffer holding only whitespace would become an empty chunk.
    if !content.is_empty() {
        chunks.push(TextChunk { content: content.to_string(), position: chunks.len() });
    }
    buffer.clear();
}

fn is_unit_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '\n')
}

/// Splits at each whitespace run whose preceding character is a terminator.
/// The run itself is dropped; the terminator stays with the left unit.
fn sentence_units(text: &str) -> Vec<&str> {
    let mut units = Vec::new();
    let mut unit_start = 0;
    let mut prev: Option<char> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c.is_whitespace() && prev.is_some_and(is_unit_terminator) {
            units.push(&text[unit_start..i]);
            let mut end = i + c.len_utf8();
            while let Some(&(j, next)) = chars.peek() {
                if !next.is_whitespace() {
                    break;
                }
                end = j + next.len_utf8();
                chars.next();
            }
            unit_start = end;
            prev = None;
            continue;
        }
        prev = Some(c);
    }
    units.push(&text[unit_start..]);
    units
}
