//! Document-level types.

use super::{Block, Paragraph, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A parsed DOCX document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Core properties (title, creator, etc.)
    pub metadata: Metadata,

    /// Body content in source order
    pub blocks: Vec<Block>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            metadata: Metadata::default(),
            blocks: Vec::new(),
        }
    }

    /// Add a block to the document.
    pub fn add_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Add a paragraph to the document.
    pub fn add_paragraph(&mut self, paragraph: Paragraph) {
        self.blocks.push(Block::Paragraph(paragraph));
    }

    /// Add a table to the document.
    pub fn add_table(&mut self, table: Table) {
        self.blocks.push(Block::Table(table));
    }

    /// Check if the document has no blocks at all.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of top-level paragraphs.
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs().count()
    }

    /// Number of top-level tables.
    pub fn table_count(&self) -> usize {
        self.tables().count()
    }

    /// Iterate over top-level paragraphs.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(Block::as_paragraph)
    }

    /// Iterate over top-level tables.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(Block::as_table)
    }

    /// Get a structural plain-text dump of the document.
    ///
    /// Blocks are separated by blank lines and table cells by tabs. This is a
    /// debugging view; use [`crate::render::to_text`] for extraction.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::plain_text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Core document properties from `docProps/core.xml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document subject
    pub subject: Option<String>,

    /// Author (`dc:creator`)
    pub creator: Option<String>,

    /// Keywords
    pub keywords: Option<String>,

    /// Description / comments
    pub description: Option<String>,

    /// Last editor
    pub last_modified_by: Option<String>,

    /// Revision number
    pub revision: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    pub modified: Option<DateTime<Utc>>,
}

impl Metadata {
    /// Check if no property is set.
    pub fn is_empty(&self) -> bool {
        *self == Metadata::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TableRow;

    #[test]
    fn test_document_new() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert_eq!(doc.paragraph_count(), 0);
        assert!(doc.metadata.is_empty());
    }

    #[test]
    fn test_document_counts() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("Intro"));
        let mut table = Table::new();
        table.add_row(TableRow::from_strings(["a", "b"]));
        doc.add_table(table);
        doc.add_paragraph(Paragraph::with_text("Outro"));

        assert_eq!(doc.paragraph_count(), 2);
        assert_eq!(doc.table_count(), 1);
        assert_eq!(doc.plain_text(), "Intro\n\na\tb\n\nOutro");
    }

    #[test]
    fn test_metadata_is_empty() {
        let mut metadata = Metadata::default();
        assert!(metadata.is_empty());
        metadata.title = Some("Report".to_string());
        assert!(!metadata.is_empty());
    }
}
