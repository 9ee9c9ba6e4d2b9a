//! Text chunking.
//!
//! Splits extracted text into an ordered list of [`Chunk`]s according to a
//! [`ChunkingStrategy`]. Chunks are numbered from zero in output order and
//! whitespace-only chunks are never produced.

mod strategy;

use std::ops::Range;

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::Result;

pub use strategy::ChunkingStrategy;

/// A piece of extracted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position in the chunk sequence, starting at 0
    pub id: usize,

    /// Chunk text
    pub text: String,
}

/// Split text into chunks.
///
/// # Example
/// ```
/// use undocx::{chunk, ChunkingStrategy};
///
/// let chunks = chunk("first\n\nsecond", &ChunkingStrategy::ByLine).unwrap();
/// assert_eq!(chunks.len(), 2);
/// assert_eq!(chunks[1].text, "second");
/// ```
pub fn chunk(text: &str, strategy: &ChunkingStrategy) -> Result<Vec<Chunk>> {
    strategy.validate()?;

    let pieces = match *strategy {
        ChunkingStrategy::ByLine => by_line(text),
        ChunkingStrategy::ByParagraph => by_paragraph(text),
        ChunkingStrategy::FixedTokenCount {
            max_tokens,
            overlap,
        } => by_tokens(text, max_tokens, overlap),
        ChunkingStrategy::CharacterWindow { size, overlap } => {
            by_characters(text, size, overlap)
        }
    };

    let chunks: Vec<Chunk> = pieces
        .into_iter()
        .filter(|piece| !piece.trim().is_empty())
        .enumerate()
        .map(|(id, text)| Chunk { id, text })
        .collect();

    log::debug!("{} produced {} chunks", strategy, chunks.len());
    Ok(chunks)
}

fn by_line(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

fn by_paragraph(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }

    paragraphs
}

fn by_tokens(text: &str, max_tokens: usize, overlap: usize) -> Vec<String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    windows(tokens.len(), max_tokens, overlap)
        .map(|range| tokens[range].join(" "))
        .collect()
}

fn by_characters(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let graphemes: Vec<&str> = text.graphemes(true).collect();
    windows(graphemes.len(), size, overlap)
        .map(|range| graphemes[range].concat())
        .collect()
}

/// Window ranges over `len` items. Each window starts `size - overlap` items
/// after the previous one; the last window ends at `len`.
fn windows(len: usize, size: usize, overlap: usize) -> impl Iterator<Item = Range<usize>> {
    let step = size - overlap;
    let mut start = 0;
    let mut done = len == 0;

    std::iter::from_fn(move || {
        if done {
            return None;
        }
        let end = (start + size).min(len);
        let range = start..end;
        if end == len {
            done = true;
        } else {
            start += step;
        }
        Some(range)
    })
}
