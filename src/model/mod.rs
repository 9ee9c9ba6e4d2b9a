//! Document model types for DOCX content representation.
//!
//! This module defines the tree produced by the XML parser and consumed by
//! the text extractor. Only text-bearing structure is modeled: paragraphs,
//! runs, tables, rows and cells, in source order.

mod block;
mod document;
mod paragraph;
mod table;

pub use block::Block;
pub use document::{Document, Metadata};
pub use paragraph::{Paragraph, TextRun};
pub use table::{Table, TableCell, TableRow, VerticalMerge};
