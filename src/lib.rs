//! # undocx
//!
//! DOCX text extraction and knowledge-graph construction for Rust.
//!
//! This library reads the body of a Word (DOCX) document, turns it into plain
//! text, splits the text into chunks and builds a property graph linking a
//! Document node to its chunks and to nodes derived from caller metadata.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::collections::HashMap;
//! use undocx::{build_graph, extract_text, ChunkingStrategy};
//!
//! fn main() -> undocx::Result<()> {
//!     // Plain text in document order
//!     let text = extract_text("paper.docx")?;
//!     println!("{}", text);
//!
//!     // Graph JSON with one chunk per line
//!     let metadata = HashMap::from([
//!         ("journal".to_string(), "Journal of Advanced Research".to_string()),
//!         ("keywords".to_string(), "AI, ML, NLP".to_string()),
//!     ]);
//!     let json = build_graph("paper.docx", &metadata, ChunkingStrategy::ByLine)?;
//!     println!("{}", json);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Document order**: paragraphs and table cells interleaved as written
//! - **Revision aware**: inserted text is kept, deleted text is dropped
//! - **Chunking**: by line, by paragraph, token windows, grapheme windows
//! - **Graph output**: deterministic JSON with canonical metadata nodes
//! - **Parallel processing**: uses Rayon for large documents

pub mod chunk;
pub mod detect;
pub mod error;
pub mod graph;
pub mod model;
pub mod parser;
pub mod render;

#[cfg(feature = "ffi")]
pub mod ffi;

// Re-export commonly used types
pub use chunk::{chunk, Chunk, ChunkingStrategy};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_docx, ZipFormat};
pub use error::{Error, Result};
pub use graph::{Edge, FieldClass, FieldClassifier, Graph, GraphBuilder, Node};
pub use model::{
    Block, Document, Metadata, Paragraph, Table, TableCell, TableRow, TextRun, VerticalMerge,
};
pub use parser::{DocxArchive, DocxParser, ErrorMode, ExtractMode, ParseOptions};
pub use render::{ExtractionOrder, JsonFormat, TextOptions};

use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Parse a DOCX file and return a structured document.
///
/// # Example
///
/// ```no_run
/// use undocx::parse_file;
///
/// let doc = parse_file("report.docx").unwrap();
/// println!("Paragraphs: {}", doc.paragraph_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    DocxParser::open(path)?.parse()
}

/// Parse a DOCX file with custom options.
///
/// # Example
///
/// ```no_run
/// use undocx::{parse_file_with_options, ParseOptions};
///
/// let options = ParseOptions::new().lenient();
/// let doc = parse_file_with_options("report.docx", options).unwrap();
/// ```
pub fn parse_file_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Document> {
    DocxParser::open_with_options(path, options)?.parse()
}

/// Parse a DOCX from bytes.
pub fn parse_bytes(data: &[u8]) -> Result<Document> {
    DocxParser::from_bytes(data)?.parse()
}

/// Parse a DOCX from bytes with custom options.
pub fn parse_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Document> {
    DocxParser::from_bytes_with_options(data, options)?.parse()
}

/// Extract plain text from a DOCX file.
///
/// Paragraph texts and table cell texts are trimmed, empty ones dropped and
/// the rest joined with `\n` in document order. A document without text
/// yields an empty string.
///
/// # Example
///
/// ```no_run
/// use undocx::extract_text;
///
/// let text = extract_text("report.docx").unwrap();
/// println!("{}", text);
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    Undocx::new().extract_text(path)
}

/// Extract plain text from DOCX bytes.
pub fn extract_text_from_bytes(data: &[u8]) -> Result<String> {
    Undocx::new().extract_text_from_bytes(data)
}

/// Extract, chunk and build the graph of a DOCX file, returned as JSON.
///
/// # Example
///
/// ```no_run
/// use std::collections::HashMap;
/// use undocx::{build_graph, ChunkingStrategy};
///
/// let metadata = HashMap::from([("subjects".to_string(), "Physics, Chemistry".to_string())]);
/// let json = build_graph("paper.docx", &metadata, ChunkingStrategy::ByParagraph).unwrap();
/// std::fs::write("graph.json", json).unwrap();
/// ```
pub fn build_graph<P: AsRef<Path>>(
    path: P,
    metadata: &HashMap<String, String>,
    strategy: ChunkingStrategy,
) -> Result<String> {
    Undocx::new()
        .with_strategy(strategy)
        .build_graph(path, metadata)
}

/// Build the graph JSON of DOCX bytes. `source_name` becomes the Document
/// node's `source_path`.
pub fn build_graph_from_bytes(
    data: &[u8],
    source_name: &str,
    metadata: &HashMap<String, String>,
    strategy: ChunkingStrategy,
) -> Result<String> {
    Undocx::new()
        .with_strategy(strategy)
        .build_graph_from_bytes(data, source_name, metadata)
}

/// Builder for extracting text and graphs from DOCX documents.
///
/// # Example
///
/// ```no_run
/// use std::collections::HashMap;
/// use undocx::{ChunkingStrategy, JsonFormat, Undocx};
///
/// let json = Undocx::new()
///     .with_strategy(ChunkingStrategy::tokens(256).with_overlap(32))
///     .with_json_format(JsonFormat::Compact)
///     .sequential()
///     .build_graph("paper.docx", &HashMap::new())?;
/// # Ok::<(), undocx::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Undocx {
    parse_options: ParseOptions,
    text_options: TextOptions,
    strategy: ChunkingStrategy,
    json_format: JsonFormat,
    classifier: FieldClassifier,
}

impl Undocx {
    /// Create a new Undocx builder.
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::default(),
            text_options: TextOptions::default(),
            strategy: ChunkingStrategy::default(),
            json_format: JsonFormat::default(),
            classifier: FieldClassifier::default(),
        }
    }

    /// Tolerate unreadable core properties.
    pub fn lenient(mut self) -> Self {
        self.parse_options = self.parse_options.lenient();
        self
    }

    /// Set the text extraction order.
    pub fn with_order(mut self, order: ExtractionOrder) -> Self {
        self.text_options = self.text_options.with_order(order);
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.text_options = self.text_options.sequential();
        self
    }

    /// Set the chunking strategy used for graphs.
    pub fn with_strategy(mut self, strategy: ChunkingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the graph JSON format.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }

    /// Set the metadata field classifier.
    pub fn with_classifier(mut self, classifier: FieldClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Parse a DOCX file and return a result wrapper.
    pub fn parse<P: AsRef<Path>>(&self, path: P) -> Result<UndocxResult> {
        let path = path.as_ref();
        let document = DocxParser::open_with_options(path, self.parse_options.clone())?.parse()?;
        Ok(self.wrap(document, path.to_path_buf()))
    }

    /// Parse DOCX bytes and return a result wrapper.
    pub fn parse_bytes(&self, data: &[u8], source_name: &str) -> Result<UndocxResult> {
        let document = DocxParser::from_reader_with_options(
            Cursor::new(data),
            source_name,
            self.parse_options.clone(),
        )?
        .parse()?;
        Ok(self.wrap(document, PathBuf::from(source_name)))
    }

    /// Extract plain text from a DOCX file.
    pub fn extract_text<P: AsRef<Path>>(&self, path: P) -> Result<String> {
        let document = self.load(path)?;
        Ok(render::to_text(&document, &self.text_options))
    }

    /// Extract plain text from DOCX bytes.
    pub fn extract_text_from_bytes(&self, data: &[u8]) -> Result<String> {
        let document = self.load_bytes(data, "<bytes>")?;
        Ok(render::to_text(&document, &self.text_options))
    }

    /// Build the in-memory graph of a DOCX file.
    ///
    /// The chunking strategy is validated before the file is opened.
    pub fn graph<P: AsRef<Path>>(
        &self,
        path: P,
        metadata: &HashMap<String, String>,
    ) -> Result<Graph> {
        self.strategy.validate()?;
        let path = path.as_ref();
        let document = self.load(path)?;
        self.assemble(&document, path, metadata)
    }

    /// Build the in-memory graph of DOCX bytes.
    pub fn graph_from_bytes(
        &self,
        data: &[u8],
        source_name: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<Graph> {
        self.strategy.validate()?;
        let document = self.load_bytes(data, source_name)?;
        self.assemble(&document, Path::new(source_name), metadata)
    }

    /// Build the graph of a DOCX file as JSON.
    pub fn build_graph<P: AsRef<Path>>(
        &self,
        path: P,
        metadata: &HashMap<String, String>,
    ) -> Result<String> {
        let graph = self.graph(path, metadata)?;
        render::to_json(&graph, self.json_format)
    }

    /// Build the graph of DOCX bytes as JSON.
    pub fn build_graph_from_bytes(
        &self,
        data: &[u8],
        source_name: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<String> {
        let graph = self.graph_from_bytes(data, source_name, metadata)?;
        render::to_json(&graph, self.json_format)
    }

    fn load<P: AsRef<Path>>(&self, path: P) -> Result<Document> {
        let options = self.parse_options.clone().text_only();
        DocxParser::open_with_options(path, options)?.parse()
    }

    fn load_bytes(&self, data: &[u8], source_name: &str) -> Result<Document> {
        let options = self.parse_options.clone().text_only();
        DocxParser::from_reader_with_options(Cursor::new(data), source_name, options)?.parse()
    }

    fn assemble(
        &self,
        document: &Document,
        source: &Path,
        metadata: &HashMap<String, String>,
    ) -> Result<Graph> {
        let text = render::to_text(document, &self.text_options);
        let chunks = chunk::chunk(&text, &self.strategy)?;
        GraphBuilder::new(source)
            .with_metadata(metadata)
            .with_chunks(&chunks)
            .with_classifier(self.classifier.clone())
            .build()
    }

    fn wrap(&self, document: Document, source: PathBuf) -> UndocxResult {
        UndocxResult {
            document,
            source,
            text_options: self.text_options,
            strategy: self.strategy,
            json_format: self.json_format,
            classifier: self.classifier.clone(),
        }
    }
}

impl Default for Undocx {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of parsing a DOCX document.
pub struct UndocxResult {
    /// The parsed document
    pub document: Document,
    source: PathBuf,
    text_options: TextOptions,
    strategy: ChunkingStrategy,
    json_format: JsonFormat,
    classifier: FieldClassifier,
}

impl UndocxResult {
    /// Convert to plain text.
    pub fn to_text(&self) -> String {
        render::to_text(&self.document, &self.text_options)
    }

    /// Split the text into chunks.
    pub fn chunks(&self) -> Result<Vec<Chunk>> {
        chunk::chunk(&self.to_text(), &self.strategy)
    }

    /// Build the graph with the given metadata.
    pub fn graph(&self, metadata: &HashMap<String, String>) -> Result<Graph> {
        GraphBuilder::new(&self.source)
            .with_metadata(metadata)
            .with_chunks(&self.chunks()?)
            .with_classifier(self.classifier.clone())
            .build()
    }

    /// Build the graph with the given metadata as JSON.
    pub fn to_json(&self, metadata: &HashMap<String, String>) -> Result<String> {
        render::to_json(&self.graph(metadata)?, self.json_format)
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Get the path or name the document was read from.
    pub fn source(&self) -> &Path {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undocx_builder() {
        let undocx = Undocx::new()
            .lenient()
            .with_order(ExtractionOrder::ParagraphsThenTables)
            .with_strategy(ChunkingStrategy::ByParagraph)
            .with_json_format(JsonFormat::Compact)
            .sequential();

        assert_eq!(undocx.parse_options.error_mode, ErrorMode::Lenient);
        assert_eq!(undocx.text_options.order, ExtractionOrder::ParagraphsThenTables);
        assert!(!undocx.text_options.parallel);
        assert_eq!(undocx.strategy, ChunkingStrategy::ByParagraph);
        assert_eq!(undocx.json_format, JsonFormat::Compact);
    }

    #[test]
    fn test_undocx_builder_default() {
        let builder = Undocx::default();
        assert_eq!(builder.strategy, ChunkingStrategy::ByLine);
        assert_eq!(builder.json_format, JsonFormat::Pretty);
        assert!(builder.text_options.parallel);
        assert_eq!(builder.parse_options.extract_mode, ExtractMode::Full);
    }

    // ==================== Edge Case Tests ====================

    #[test]
    fn test_parse_bytes_empty_data() {
        let result = parse_bytes(&[]);
        assert!(matches!(result, Err(Error::Archive { .. })));
    }

    #[test]
    fn test_extract_text_from_garbage() {
        let data = [0xFF, 0xFE, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let result = extract_text_from_bytes(&data);
        assert!(matches!(result, Err(Error::Archive { .. })));
    }

    #[test]
    fn test_extract_text_missing_file() {
        let err = extract_text("does/not/exist.docx").unwrap_err();
        assert_eq!(err.stage(), "container");
        assert!(err.to_string().contains("does/not/exist.docx"));
    }

    #[test]
    fn test_strategy_checked_before_reading() {
        let strategy = ChunkingStrategy::characters(10).with_overlap(10);
        let result = build_graph_from_bytes(b"not a zip", "x.docx", &HashMap::new(), strategy);
        assert!(matches!(result, Err(Error::UnsupportedStrategy(_))));
    }

    #[test]
    fn test_builder_parse_invalid_bytes() {
        let err = Undocx::new().parse_bytes(b"not a docx", "upload.docx").err().unwrap();
        match err {
            Error::Archive { path, .. } => assert_eq!(path, "upload.docx"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
