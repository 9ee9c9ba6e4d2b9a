//! WordprocessingML body parsing.
//!
//! The main document part is read with a namespace-aware pull parser and
//! turned into the block model by recursive descent. Only a small set of
//! elements is interpreted; every other element is skipped together with its
//! whole subtree, so deleted revisions, drawings and field instructions never
//! reach the extracted text.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

use crate::error::{Error, Result};
use crate::model::{Block, Document, Paragraph, Table, TableCell, TableRow, TextRun, VerticalMerge};

const WML_TRANSITIONAL: &[u8] = b"http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const WML_STRICT: &[u8] = b"http://purl.oclc.org/ooxml/wordprocessingml/main";

/// Parse the main document part into a [`Document`].
///
/// Fails with [`Error::MalformedXml`] if the XML is not well formed or has no
/// `w:body`. An empty body yields an empty document.
pub fn parse_document_xml(data: &[u8]) -> Result<Document> {
    let mut parser = BodyParser::new(data);
    let blocks = parser.parse_root()?;

    let mut document = Document::new();
    document.blocks = blocks;
    Ok(document)
}

/// Interpreted WordprocessingML elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Document,
    Body,
    Paragraph,
    Run,
    Text,
    Tab,
    /// `w:br`; `line` is false for page and column breaks
    Break { line: bool },
    CarriageReturn,
    NoBreakHyphen,
    Table,
    Row,
    Cell,
    CellProperties,
    GridSpan(u32),
    VerticalMerge(VerticalMerge),
    /// Wrapper whose children are read as if they were its parent's
    Container,
    /// Anything else. This includes `w:sym`, whose glyph is a code point in
    /// the private range of a symbol font and has no text equivalent.
    Other,
}

impl Tag {
    fn classify(ns: &ResolveResult, start: &BytesStart) -> Self {
        if !is_wordprocessing(ns) {
            return Tag::Other;
        }

        match start.local_name().as_ref() {
            b"document" => Tag::Document,
            b"body" => Tag::Body,
            b"p" => Tag::Paragraph,
            b"r" => Tag::Run,
            b"t" => Tag::Text,
            b"tab" | b"ptab" => Tag::Tab,
            b"br" => Tag::Break {
                line: matches!(attribute(start, b"type").as_deref(), None | Some("textWrapping")),
            },
            b"cr" => Tag::CarriageReturn,
            b"noBreakHyphen" => Tag::NoBreakHyphen,
            b"tbl" => Tag::Table,
            b"tr" => Tag::Row,
            b"tc" => Tag::Cell,
            b"tcPr" => Tag::CellProperties,
            b"gridSpan" => Tag::GridSpan(
                attribute(start, b"val")
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(1),
            ),
            b"vMerge" => Tag::VerticalMerge(match attribute(start, b"val").as_deref() {
                Some("restart") => VerticalMerge::Restart,
                _ => VerticalMerge::Continue,
            }),
            b"hyperlink" | b"ins" | b"moveTo" | b"smartTag" | b"fldSimple" | b"sdt"
            | b"sdtContent" | b"customXml" | b"dir" | b"bdo" => Tag::Container,
            _ => Tag::Other,
        }
    }
}

fn is_wordprocessing(ns: &ResolveResult) -> bool {
    match ns {
        ResolveResult::Bound(Namespace(uri)) => *uri == WML_TRANSITIONAL || *uri == WML_STRICT,
        // Fragments written without namespace declarations still use `w:`
        ResolveResult::Unknown(prefix) => prefix.as_slice() == b"w",
        ResolveResult::Unbound => false,
    }
}

fn attribute(start: &BytesStart, name: &[u8]) -> Option<String> {
    start
        .attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == name)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Owned pull-parser event.
enum Node {
    Open { tag: Tag, empty: bool },
    Close,
    Text(String),
    Eof,
}

struct BodyParser<'a> {
    reader: NsReader<&'a [u8]>,
    buf: Vec<u8>,
    depth: usize,
}

impl<'a> BodyParser<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            reader: NsReader::from_reader(data),
            buf: Vec::new(),
            depth: 0,
        }
    }

    fn next_node(&mut self) -> Result<Node> {
        loop {
            let position = self.reader.buffer_position();
            self.buf.clear();
            let (ns, event) = self
                .reader
                .read_resolved_event_into(&mut self.buf)
                .map_err(|e| malformed(position, e))?;

            match event {
                Event::Start(start) => {
                    self.depth += 1;
                    return Ok(Node::Open {
                        tag: Tag::classify(&ns, &start),
                        empty: false,
                    });
                }
                Event::Empty(start) => {
                    return Ok(Node::Open {
                        tag: Tag::classify(&ns, &start),
                        empty: true,
                    });
                }
                Event::End(_) => {
                    self.depth = self.depth.saturating_sub(1);
                    return Ok(Node::Close);
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(|e| malformed(position, e))?;
                    return Ok(Node::Text(text.into_owned()));
                }
                Event::CData(data) => {
                    let text = String::from_utf8(data.into_inner().into_owned())
                        .map_err(|e| malformed(position, e))?;
                    return Ok(Node::Text(text));
                }
                Event::Eof => {
                    if self.depth > 0 {
                        return Err(Error::MalformedXml(format!(
                            "unexpected end of document at byte {}: {} element(s) left open",
                            position, self.depth
                        )));
                    }
                    return Ok(Node::Eof);
                }
                _ => continue,
            }
        }
    }

    fn parse_root(&mut self) -> Result<Vec<Block>> {
        let mut body = None;

        loop {
            match self.next_node()? {
                Node::Open {
                    tag: Tag::Document,
                    ..
                } => {}
                Node::Open {
                    tag: Tag::Body,
                    empty,
                } => {
                    let mut blocks = Vec::new();
                    if !empty {
                        self.collect_blocks(&mut blocks)?;
                    }
                    if body.is_none() {
                        body = Some(blocks);
                    } else {
                        log::warn!("ignoring additional w:body element");
                    }
                }
                Node::Open { empty: false, .. } => self.skip_subtree()?,
                Node::Open { .. } | Node::Close | Node::Text(_) => {}
                Node::Eof => break,
            }
        }

        body.ok_or_else(|| Error::MalformedXml("document has no w:body element".to_string()))
    }

    /// Read block content until the enclosing element closes.
    fn collect_blocks(&mut self, blocks: &mut Vec<Block>) -> Result<()> {
        loop {
            match self.next_node()? {
                Node::Open { tag, empty } => self.push_block(tag, empty, blocks)?,
                Node::Text(_) => {}
                Node::Close => return Ok(()),
                Node::Eof => return Err(unexpected_eof("block content")),
            }
        }
    }

    fn push_block(&mut self, tag: Tag, empty: bool, blocks: &mut Vec<Block>) -> Result<()> {
        match (tag, empty) {
            (Tag::Paragraph, true) => blocks.push(Block::Paragraph(Paragraph::new())),
            (Tag::Paragraph, false) => blocks.push(Block::Paragraph(self.parse_paragraph()?)),
            (Tag::Table, true) => blocks.push(Block::Table(Table::new())),
            (Tag::Table, false) => blocks.push(Block::Table(self.parse_table()?)),
            (Tag::Container, false) => self.collect_blocks(blocks)?,
            (_, false) => self.skip_subtree()?,
            (_, true) => {}
        }
        Ok(())
    }

    fn parse_table(&mut self) -> Result<Table> {
        let mut table = Table::new();
        self.collect_rows(&mut table)?;
        Ok(table)
    }

    fn collect_rows(&mut self, table: &mut Table) -> Result<()> {
        loop {
            match self.next_node()? {
                Node::Open {
                    tag: Tag::Row,
                    empty,
                } => {
                    let mut row = TableRow::default();
                    if !empty {
                        self.collect_cells(&mut row)?;
                    }
                    table.add_row(row);
                }
                Node::Open {
                    tag: Tag::Container,
                    empty: false,
                } => self.collect_rows(table)?,
                Node::Open { empty: false, .. } => self.skip_subtree()?,
                Node::Open { .. } | Node::Text(_) => {}
                Node::Close => return Ok(()),
                Node::Eof => return Err(unexpected_eof("table")),
            }
        }
    }

    fn collect_cells(&mut self, row: &mut TableRow) -> Result<()> {
        loop {
            match self.next_node()? {
                Node::Open {
                    tag: Tag::Cell,
                    empty,
                } => {
                    let cell = if empty {
                        TableCell::empty()
                    } else {
                        self.parse_cell()?
                    };
                    row.cells.push(cell);
                }
                Node::Open {
                    tag: Tag::Container,
                    empty: false,
                } => self.collect_cells(row)?,
                Node::Open { empty: false, .. } => self.skip_subtree()?,
                Node::Open { .. } | Node::Text(_) => {}
                Node::Close => return Ok(()),
                Node::Eof => return Err(unexpected_eof("table row")),
            }
        }
    }

    fn parse_cell(&mut self) -> Result<TableCell> {
        let mut cell = TableCell::empty();
        loop {
            match self.next_node()? {
                Node::Open {
                    tag: Tag::CellProperties,
                    empty: false,
                } => self.parse_cell_properties(&mut cell)?,
                Node::Open { tag, empty } => self.push_block(tag, empty, &mut cell.blocks)?,
                Node::Text(_) => {}
                Node::Close => return Ok(cell),
                Node::Eof => return Err(unexpected_eof("table cell")),
            }
        }
    }

    fn parse_cell_properties(&mut self, cell: &mut TableCell) -> Result<()> {
        loop {
            match self.next_node()? {
                Node::Open {
                    tag: Tag::GridSpan(span),
                    empty,
                } => {
                    cell.colspan = span.max(1);
                    self.finish(empty)?;
                }
                Node::Open {
                    tag: Tag::VerticalMerge(merge),
                    empty,
                } => {
                    cell.vertical_merge = Some(merge);
                    self.finish(empty)?;
                }
                Node::Open { empty: false, .. } => self.skip_subtree()?,
                Node::Open { .. } | Node::Text(_) => {}
                Node::Close => return Ok(()),
                Node::Eof => return Err(unexpected_eof("cell properties")),
            }
        }
    }

    fn parse_paragraph(&mut self) -> Result<Paragraph> {
        let mut paragraph = Paragraph::new();
        self.collect_runs(&mut paragraph)?;
        Ok(paragraph)
    }

    fn collect_runs(&mut self, paragraph: &mut Paragraph) -> Result<()> {
        loop {
            match self.next_node()? {
                Node::Open {
                    tag: Tag::Run,
                    empty: false,
                } => {
                    let run = self.parse_run()?;
                    if !run.is_empty() {
                        paragraph.add_run(run);
                    }
                }
                Node::Open {
                    tag: Tag::Container,
                    empty: false,
                } => self.collect_runs(paragraph)?,
                Node::Open { empty: false, .. } => self.skip_subtree()?,
                Node::Open { .. } | Node::Text(_) => {}
                Node::Close => return Ok(()),
                Node::Eof => return Err(unexpected_eof("paragraph")),
            }
        }
    }

    fn parse_run(&mut self) -> Result<TextRun> {
        let mut text = String::new();
        loop {
            match self.next_node()? {
                Node::Open {
                    tag: Tag::Text,
                    empty: false,
                } => self.read_text(&mut text)?,
                Node::Open {
                    tag: Tag::Tab,
                    empty,
                } => {
                    text.push('\t');
                    self.finish(empty)?;
                }
                Node::Open {
                    tag: Tag::Break { line },
                    empty,
                } => {
                    if line {
                        text.push('\n');
                    }
                    self.finish(empty)?;
                }
                Node::Open {
                    tag: Tag::CarriageReturn,
                    empty,
                } => {
                    text.push('\n');
                    self.finish(empty)?;
                }
                Node::Open {
                    tag: Tag::NoBreakHyphen,
                    empty,
                } => {
                    text.push('-');
                    self.finish(empty)?;
                }
                Node::Open { empty: false, .. } => self.skip_subtree()?,
                Node::Open { .. } | Node::Text(_) => {}
                Node::Close => return Ok(TextRun::new(text)),
                Node::Eof => return Err(unexpected_eof("run")),
            }
        }
    }

    fn read_text(&mut self, text: &mut String) -> Result<()> {
        loop {
            match self.next_node()? {
                Node::Text(t) => text.push_str(&t),
                Node::Open { empty: false, .. } => self.skip_subtree()?,
                Node::Open { .. } => {}
                Node::Close => return Ok(()),
                Node::Eof => return Err(unexpected_eof("text")),
            }
        }
    }

    /// Consume the rest of an element whose start tag was just read.
    fn finish(&mut self, empty: bool) -> Result<()> {
        if empty {
            Ok(())
        } else {
            self.skip_subtree()
        }
    }

    fn skip_subtree(&mut self) -> Result<()> {
        let mut depth = 1usize;
        while depth > 0 {
            match self.next_node()? {
                Node::Open { empty: false, .. } => depth += 1,
                Node::Close => depth -= 1,
                Node::Open { .. } | Node::Text(_) => {}
                Node::Eof => return Err(unexpected_eof("skipped element")),
            }
        }
        Ok(())
    }
}

fn malformed(position: impl std::fmt::Display, err: impl std::fmt::Display) -> Error {
    Error::MalformedXml(format!("at byte {}: {}", position, err))
}

fn unexpected_eof(context: &str) -> Error {
    Error::MalformedXml(format!("unexpected end of document inside {}", context))
}
