//! Error types for undocx library.

use std::io;
use thiserror::Error;

/// Result type alias for undocx operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting text or building a graph.
#[derive(Error, Debug)]
pub enum Error {
    /// The input could not be opened as a zip container.
    ///
    /// Covers missing or unreadable paths as well as data that is not a zip.
    #[error("archive error: {path}: {reason}")]
    Archive {
        /// Path (or source name) of the offending input
        path: String,
        /// What went wrong
        reason: String,
    },

    /// A required package part is absent (the zip is not a DOCX).
    #[error("missing part: {0}")]
    MissingPart(String),

    /// The document XML could not be parsed or is structurally invalid.
    #[error("malformed XML: {0}")]
    MalformedXml(String),

    /// Unknown chunking strategy or invalid strategy parameters.
    #[error("unsupported chunking strategy: {0}")]
    UnsupportedStrategy(String),

    /// Internal graph invariant violation or JSON serialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error when writing output.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create an archive error for the given path.
    pub(crate) fn archive(path: impl Into<String>, reason: impl ToString) -> Self {
        Error::Archive {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Pipeline stage that produced this error.
    pub fn stage(&self) -> &'static str {
        match self {
            Error::Archive { .. } | Error::MissingPart(_) => "container",
            Error::MalformedXml(_) => "xml",
            Error::UnsupportedStrategy(_) => "chunking",
            Error::Serialization(_) => "graph",
            Error::Io(_) => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::archive("missing.docx", "No such file or directory");
        assert_eq!(
            err.to_string(),
            "archive error: missing.docx: No such file or directory"
        );

        let err = Error::MissingPart("word/document.xml".to_string());
        assert_eq!(err.to_string(), "missing part: word/document.xml");
    }

    #[test]
    fn test_error_stage() {
        assert_eq!(Error::MalformedXml("x".into()).stage(), "xml");
        assert_eq!(Error::UnsupportedStrategy("x".into()).stage(), "chunking");
        assert_eq!(Error::Serialization("x".into()).stage(), "graph");
        assert_eq!(Error::archive("a", "b").stage(), "container");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
