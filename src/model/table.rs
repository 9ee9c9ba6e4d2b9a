//! Table types.

use super::{Block, Paragraph};
use serde::{Deserialize, Serialize};

/// A table structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    /// Rows in the table
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of grid columns (based on first row, honoring spans).
    pub fn column_count(&self) -> usize {
        self.rows
            .first()
            .map(|r| r.cells.iter().map(|c| c.colspan as usize).sum())
            .unwrap_or(0)
    }

    /// Check if the table has no visible text.
    pub fn is_empty(&self) -> bool {
        self.rows.iter().flat_map(|r| &r.cells).all(TableCell::is_empty)
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Check if the table has merged cells.
    pub fn has_merged_cells(&self) -> bool {
        self.rows
            .iter()
            .flat_map(|r| &r.cells)
            .any(TableCell::is_merged)
    }
}

/// A table row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableRow {
    /// Cells in the row
    pub cells: Vec<TableCell>,
}

impl TableRow {
    /// Create a new row with cells.
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self { cells }
    }

    /// Create a row from text values.
    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::new(values.into_iter().map(TableCell::text).collect())
    }

    /// Get plain text representation.
    pub fn plain_text(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.plain_text())
            .collect::<Vec<_>>()
            .join("\t")
    }
}

/// A table cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableCell {
    /// Cell content (paragraphs and nested tables)
    pub blocks: Vec<Block>,

    /// Number of grid columns this cell spans
    pub colspan: u32,

    /// Vertical merge state, if the cell takes part in one
    pub vertical_merge: Option<VerticalMerge>,
}

impl TableCell {
    /// Create a cell with a single paragraph of text.
    pub fn text(text: impl Into<String>) -> Self {
        Self::with_content(vec![Block::Paragraph(Paragraph::with_text(text))])
    }

    /// Create an empty cell.
    pub fn empty() -> Self {
        Self::with_content(Vec::new())
    }

    /// Create a cell with the given blocks.
    pub fn with_content(blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            colspan: 1,
            vertical_merge: None,
        }
    }

    /// Set colspan and return self.
    pub fn colspan(mut self, span: u32) -> Self {
        self.colspan = span.max(1);
        self
    }

    /// Get the cell text: direct paragraphs joined by newlines.
    ///
    /// Nested tables are not included; they are separate extraction units.
    pub fn plain_text(&self) -> String {
        self.paragraphs()
            .map(Paragraph::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Iterate over the direct paragraphs of the cell.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(Block::as_paragraph)
    }

    /// Iterate over tables nested in the cell.
    pub fn nested_tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(Block::as_table)
    }

    /// Check if the cell has no visible text, nested tables included.
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(Block::is_empty)
    }

    /// Check if this cell spans columns or takes part in a vertical merge.
    pub fn is_merged(&self) -> bool {
        self.colspan > 1 || self.vertical_merge.is_some()
    }
}

impl Default for TableCell {
    fn default() -> Self {
        Self::empty()
    }
}

/// Vertical merge state of a cell (`w:vMerge`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalMerge {
    /// First cell of a merged range
    Restart,
    /// Cell covered by the merged range above
    Continue,
}
