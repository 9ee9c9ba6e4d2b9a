//! Text extraction options.

use serde::{Deserialize, Serialize};

/// Blocks smaller documents than this are rendered on the calling thread.
pub(crate) const PARALLEL_THRESHOLD: usize = 64;

/// Options for turning a document into plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextOptions {
    /// Order in which paragraphs and tables are emitted
    pub order: ExtractionOrder,

    /// Whether to render blocks on the rayon thread pool
    pub parallel: bool,
}

impl TextOptions {
    /// Create new text options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the extraction order.
    pub fn with_order(mut self, order: ExtractionOrder) -> Self {
        self.order = order;
        self
    }

    /// Enable or disable parallel rendering.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel rendering.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            order: ExtractionOrder::DocumentOrder,
            parallel: true,
        }
    }
}

/// Order of extracted text units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionOrder {
    /// Paragraphs and tables interleaved as they appear in the body
    #[default]
    DocumentOrder,

    /// All top-level paragraphs first, then all tables, with each cell
    /// repeated for every grid column it spans or covers through a vertical
    /// merge (the `row.cells` layout of python-docx)
    ParagraphsThenTables,
}
