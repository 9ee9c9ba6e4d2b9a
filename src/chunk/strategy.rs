//! Chunking strategy selection and validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How extracted text is divided into chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ChunkingStrategy {
    /// One chunk per non-empty line
    #[default]
    ByLine,

    /// One chunk per blank-line separated paragraph
    ByParagraph,

    /// Windows of whitespace-delimited tokens
    FixedTokenCount {
        /// Tokens per chunk
        max_tokens: usize,
        /// Tokens shared with the previous chunk
        overlap: usize,
    },

    /// Windows of grapheme clusters
    CharacterWindow {
        /// Characters per chunk
        size: usize,
        /// Characters shared with the previous chunk
        overlap: usize,
    },
}

impl ChunkingStrategy {
    /// Token windows without overlap.
    pub fn tokens(max_tokens: usize) -> Self {
        ChunkingStrategy::FixedTokenCount {
            max_tokens,
            overlap: 0,
        }
    }

    /// Character windows without overlap.
    pub fn characters(size: usize) -> Self {
        ChunkingStrategy::CharacterWindow { size, overlap: 0 }
    }

    /// Set the overlap of a windowed strategy. Line and paragraph strategies
    /// are returned unchanged.
    pub fn with_overlap(self, overlap: usize) -> Self {
        match self {
            ChunkingStrategy::FixedTokenCount { max_tokens, .. } => {
                ChunkingStrategy::FixedTokenCount {
                    max_tokens,
                    overlap,
                }
            }
            ChunkingStrategy::CharacterWindow { size, .. } => {
                ChunkingStrategy::CharacterWindow { size, overlap }
            }
            other => other,
        }
    }

    /// Check the window parameters.
    ///
    /// Window sizes must be positive and larger than the overlap, otherwise
    /// the window would never advance.
    pub fn validate(&self) -> Result<()> {
        let (unit, size, overlap) = match *self {
            ChunkingStrategy::ByLine | ChunkingStrategy::ByParagraph => return Ok(()),
            ChunkingStrategy::FixedTokenCount {
                max_tokens,
                overlap,
            } => ("max_tokens", max_tokens, overlap),
            ChunkingStrategy::CharacterWindow { size, overlap } => ("size", size, overlap),
        };

        if size == 0 {
            return Err(Error::UnsupportedStrategy(format!(
                "{}: {} must be greater than zero",
                self, unit
            )));
        }
        if overlap >= size {
            return Err(Error::UnsupportedStrategy(format!(
                "{}: overlap {} must be smaller than {} {}",
                self, overlap, unit, size
            )));
        }
        Ok(())
    }
}

impl fmt::Display for ChunkingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ChunkingStrategy::ByLine => write!(f, "by-line"),
            ChunkingStrategy::ByParagraph => write!(f, "by-paragraph"),
            ChunkingStrategy::FixedTokenCount {
                max_tokens,
                overlap,
            } => write!(f, "tokens:{}:{}", max_tokens, overlap),
            ChunkingStrategy::CharacterWindow { size, overlap } => {
                write!(f, "chars:{}:{}", size, overlap)
            }
        }
    }
}

impl FromStr for ChunkingStrategy {
    type Err = Error;

    /// Parse `by-line`, `by-paragraph`, `tokens:<n>[:<overlap>]` or
    /// `chars:<n>[:<overlap>]`.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        let mut parts = normalized.split(':');
        let name = parts.next().unwrap_or_default();
        let params: Vec<&str> = parts.collect();

        let strategy = match (name, params.as_slice()) {
            ("by-line" | "line", []) => ChunkingStrategy::ByLine,
            ("by-paragraph" | "paragraph", []) => ChunkingStrategy::ByParagraph,
            ("tokens", [n]) => ChunkingStrategy::tokens(number(s, n)?),
            ("tokens", [n, o]) => ChunkingStrategy::tokens(number(s, n)?).with_overlap(number(s, o)?),
            ("chars", [n]) => ChunkingStrategy::characters(number(s, n)?),
            ("chars", [n, o]) => {
                ChunkingStrategy::characters(number(s, n)?).with_overlap(number(s, o)?)
            }
            _ => {
                return Err(Error::UnsupportedStrategy(format!(
                    "{:?} (expected by-line, by-paragraph, tokens:<n>[:<overlap>] or chars:<n>[:<overlap>])",
                    s
                )))
            }
        };

        strategy.validate()?;
        Ok(strategy)
    }
}

fn number(input: &str, value: &str) -> Result<usize> {
    value.trim().parse().map_err(|_| {
        Error::UnsupportedStrategy(format!("{:?}: {:?} is not a number", input, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_strategies() {
        assert_eq!("by-line".parse::<ChunkingStrategy>().unwrap(), ChunkingStrategy::ByLine);
        assert_eq!("By_Paragraph".parse::<ChunkingStrategy>().unwrap(), ChunkingStrategy::ByParagraph);
        assert_eq!(
            "tokens:128:16".parse::<ChunkingStrategy>().unwrap(),
            ChunkingStrategy::FixedTokenCount {
                max_tokens: 128,
                overlap: 16
            }
        );
        assert_eq!(
            "chars:500".parse::<ChunkingStrategy>().unwrap(),
            ChunkingStrategy::CharacterWindow {
                size: 500,
                overlap: 0
            }
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        for input in ["sentences", "tokens", "tokens:x", "chars:10:2:1", ""] {
            let err = input.parse::<ChunkingStrategy>().unwrap_err();
            assert!(matches!(err, Error::UnsupportedStrategy(_)), "{input}");
        }
    }

    #[test]
    fn test_validate() {
        assert!(ChunkingStrategy::ByLine.validate().is_ok());
        assert!(ChunkingStrategy::tokens(10).with_overlap(9).validate().is_ok());
        assert!(ChunkingStrategy::tokens(0).validate().is_err());
        assert!(ChunkingStrategy::characters(10).with_overlap(10).validate().is_err());
        assert!("chars:5:7".parse::<ChunkingStrategy>().is_err());
    }

    #[test]
    fn test_display_parses_back() {
        for strategy in [
            ChunkingStrategy::ByLine,
            ChunkingStrategy::ByParagraph,
            ChunkingStrategy::tokens(64).with_overlap(8),
            ChunkingStrategy::characters(20).with_overlap(5),
        ] {
            assert_eq!(strategy.to_string().parse::<ChunkingStrategy>().unwrap(), strategy);
        }
    }

    #[test]
    fn test_serde_tagged() {
        let json = serde_json::to_string(&ChunkingStrategy::characters(20).with_overlap(5)).unwrap();
        assert_eq!(json, r#"{"strategy":"character_window","size":20,"overlap":5}"#);

        let parsed: ChunkingStrategy = serde_json::from_str(r#"{"strategy":"by_line"}"#).unwrap();
        assert_eq!(parsed, ChunkingStrategy::ByLine);
    }
}
