//! Plain text extraction.
//!
//! Every paragraph and every table cell is one text unit. Units are trimmed,
//! empty units are dropped and the rest are joined with `\n`. A cell's text is
//! its direct paragraphs joined with `\n`; tables nested in a cell follow it
//! as units of their own.
//!
//! In [`ExtractionOrder::ParagraphsThenTables`] tables are read by grid
//! position: a cell spanning several columns, or covered by a vertical merge,
//! yields one unit per grid column it occupies.

use std::collections::HashSet;

use rayon::prelude::*;

use crate::model::{Block, Document, Table, TableCell, VerticalMerge};

use super::options::{ExtractionOrder, TextOptions, PARALLEL_THRESHOLD};

/// Convert a document to plain text.
pub fn to_text(doc: &Document, options: &TextOptions) -> String {
    text_units(doc, options).join("\n")
}

/// Collect the non-empty, trimmed text units of a document in output order.
pub fn text_units(doc: &Document, options: &TextOptions) -> Vec<String> {
    let blocks: Vec<&Block> = match options.order {
        ExtractionOrder::DocumentOrder => doc.blocks.iter().collect(),
        ExtractionOrder::ParagraphsThenTables => doc
            .blocks
            .iter()
            .filter(|b| matches!(b, Block::Paragraph(_)))
            .chain(doc.blocks.iter().filter(|b| matches!(b, Block::Table(_))))
            .collect(),
    };

    // rayon's indexed collect keeps block order
    let per_block: Vec<Vec<String>> = if options.parallel && blocks.len() >= PARALLEL_THRESHOLD {
        blocks.par_iter().map(|block| block_units(block, options.order)).collect()
    } else {
        blocks.iter().map(|block| block_units(block, options.order)).collect()
    };

    per_block.into_iter().flatten().collect()
}

fn block_units(block: &Block, order: ExtractionOrder) -> Vec<String> {
    let mut units = Vec::new();
    match (block, order) {
        (Block::Paragraph(paragraph), _) => push_unit(&paragraph.plain_text(), &mut units),
        (Block::Table(table), ExtractionOrder::DocumentOrder) => {
            push_table_units(table, &mut units)
        }
        (Block::Table(table), ExtractionOrder::ParagraphsThenTables) => {
            push_grid_units(table, &mut units)
        }
    }
    units
}

fn push_table_units(table: &Table, units: &mut Vec<String>) {
    for cell in table.rows.iter().flat_map(|row| &row.cells) {
        push_unit(&cell.plain_text(), units);
        for nested in cell.nested_tables() {
            push_table_units(nested, units);
        }
    }
}

/// Cell units per grid position. Nested tables follow the first position of
/// their cell only.
fn push_grid_units(table: &Table, units: &mut Vec<String>) {
    let mut expanded: HashSet<*const TableCell> = HashSet::new();
    for cell in grid_rows(table).into_iter().flatten() {
        push_unit(&cell.plain_text(), units);
        if expanded.insert(cell as *const TableCell) {
            for nested in cell.nested_tables() {
                push_grid_units(nested, units);
            }
        }
    }
}

/// Lay out the cells of a table on its grid. A `Continue` cell stands for
/// the cell above it in the same column.
fn grid_rows(table: &Table) -> Vec<Vec<&TableCell>> {
    let mut rows: Vec<Vec<&TableCell>> = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let mut grid: Vec<&TableCell> = Vec::new();
        for cell in &row.cells {
            for _ in 0..cell.colspan.max(1) {
                let above = match (cell.vertical_merge, rows.last()) {
                    (Some(VerticalMerge::Continue), Some(previous)) => {
                        previous.get(grid.len()).copied()
                    }
                    _ => None,
                };
                grid.push(above.unwrap_or(cell));
            }
        }
        rows.push(grid);
    }
    rows
}

fn push_unit(text: &str, units: &mut Vec<String>) {
    let text = text.trim();
    if !text.is_empty() {
        units.push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Paragraph, TableCell, TableRow};

    fn sample() -> Document {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("  Intro  "));
        let mut table = Table::new();
        table.add_row(TableRow::from_strings(["A1", " ", "B1"]));
        doc.add_table(table);
        doc.add_paragraph(Paragraph::new());
        doc.add_paragraph(Paragraph::with_text("Outro"));
        doc
    }

    #[test]
    fn test_document_order() {
        let text = to_text(&sample(), &TextOptions::default());
        assert_eq!(text, "Intro\nA1\nB1\nOutro");
    }

    #[test]
    fn test_paragraphs_then_tables() {
        let options = TextOptions::new().with_order(ExtractionOrder::ParagraphsThenTables);
        assert_eq!(to_text(&sample(), &options), "Intro\nOutro\nA1\nB1");
    }

    fn merged_table() -> Document {
        let mut restart = TableCell::text("Top");
        restart.vertical_merge = Some(VerticalMerge::Restart);
        let mut covered = TableCell::empty();
        covered.vertical_merge = Some(VerticalMerge::Continue);

        let mut table = Table::new();
        table.add_row(TableRow::new(vec![TableCell::text("Wide").colspan(2)]));
        table.add_row(TableRow::new(vec![restart, TableCell::text("B")]));
        table.add_row(TableRow::new(vec![covered, TableCell::text("C")]));

        let mut doc = Document::new();
        doc.add_table(table);
        doc.add_paragraph(Paragraph::with_text("After"));
        doc
    }

    #[test]
    fn test_merged_cells_in_document_order() {
        let text = to_text(&merged_table(), &TextOptions::default());
        assert_eq!(text, "Wide\nTop\nB\nC\nAfter");
    }

    #[test]
    fn test_merged_cells_repeat_by_grid_position() {
        let options = TextOptions::new().with_order(ExtractionOrder::ParagraphsThenTables);
        assert_eq!(
            to_text(&merged_table(), &options),
            "After\nWide\nWide\nTop\nB\nTop\nC"
        );
    }

    #[test]
    fn test_nested_table_units() {
        let mut inner = Table::new();
        inner.add_row(TableRow::from_strings(["inner"]));
        let cell = TableCell::with_content(vec![
            Block::Paragraph(Paragraph::with_text("outer")),
            Block::Table(inner),
            Block::Paragraph(Paragraph::with_text("tail")),
        ]);
        let mut table = Table::new();
        table.add_row(TableRow::new(vec![cell, TableCell::text("next")]));
        let mut doc = Document::new();
        doc.add_table(table);

        assert_eq!(
            to_text(&doc, &TextOptions::default()),
            "outer\ntail\ninner\nnext"
        );
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(to_text(&Document::new(), &TextOptions::default()), "");
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut doc = Document::new();
        for i in 0..(PARALLEL_THRESHOLD * 3) {
            if i % 7 == 0 {
                let mut table = Table::new();
                table.add_row(TableRow::from_strings([format!("cell {i}"), String::new()]));
                doc.add_table(table);
            } else {
                doc.add_paragraph(Paragraph::with_text(format!("paragraph {i}")));
            }
        }

        let parallel = to_text(&doc, &TextOptions::default());
        let sequential = to_text(&doc, &TextOptions::new().sequential());
        assert_eq!(parallel, sequential);
        assert!(parallel.starts_with("cell 0\nparagraph 1\n"));
    }
}
