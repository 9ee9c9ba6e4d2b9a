//! DOCX document parser.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use crate::error::Result;
use crate::model::{Document, Metadata};

use super::archive::DocxArchive;
use super::options::{ErrorMode, ExtractMode, ParseOptions};
use super::properties::parse_core_properties;
use super::xml::parse_document_xml;

/// DOCX document parser.
///
/// Holds the opened package until [`DocxParser::parse`] consumes it.
pub struct DocxParser<R> {
    archive: DocxArchive<R>,
    options: ParseOptions,
}

impl DocxParser<BufReader<File>> {
    /// Open a DOCX file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a DOCX file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let archive = DocxArchive::open(path)?;
        Ok(Self { archive, options })
    }
}

impl<'a> DocxParser<Cursor<&'a [u8]>> {
    /// Parse a DOCX from bytes.
    pub fn from_bytes(data: &'a [u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Parse a DOCX from bytes with custom options.
    pub fn from_bytes_with_options(data: &'a [u8], options: ParseOptions) -> Result<Self> {
        let archive = DocxArchive::from_bytes(data)?;
        Ok(Self { archive, options })
    }
}

impl<R: Read + Seek> DocxParser<R> {
    /// Parse a DOCX from a seekable reader.
    pub fn from_reader_with_options(
        reader: R,
        source: impl Into<String>,
        options: ParseOptions,
    ) -> Result<Self> {
        let archive = DocxArchive::from_reader(reader, source)?;
        Ok(Self { archive, options })
    }

    /// Parse the document and return a structured Document.
    ///
    /// The package is released when this returns, on success or failure.
    pub fn parse(mut self) -> Result<Document> {
        let main = self.archive.read_main_part()?;
        let mut document = parse_document_xml(&main)?;

        if self.options.extract_mode == ExtractMode::Full {
            document.metadata = self.extract_metadata()?;
        }

        log::debug!(
            "parsed {}: {} paragraphs, {} tables",
            self.archive.source(),
            document.paragraph_count(),
            document.table_count()
        );
        Ok(document)
    }

    fn extract_metadata(&mut self) -> Result<Metadata> {
        let Some(data) = self.archive.read_core_properties()? else {
            return Ok(Metadata::default());
        };

        match parse_core_properties(&data) {
            Ok(metadata) => Ok(metadata),
            Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                log::warn!("{}: skipping core properties: {}", self.archive.source(), e);
                Ok(Metadata::default())
            }
            Err(e) => Err(e),
        }
    }
}
