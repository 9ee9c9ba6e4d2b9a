//! OOXML package (zip container) access.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{Error, Result};

/// Conventional location of the main document part.
pub const DEFAULT_MAIN_PART: &str = "word/document.xml";

/// Location of the core properties part.
pub const CORE_PROPERTIES_PART: &str = "docProps/core.xml";

const PACKAGE_RELATIONSHIPS_PART: &str = "_rels/.rels";
const OFFICE_DOCUMENT_RELATIONSHIP: &str = "/officeDocument";

/// An opened DOCX package.
///
/// Owns the underlying reader; dropping the archive releases the file handle.
pub struct DocxArchive<R> {
    source: String,
    zip: ZipArchive<R>,
}

impl DocxArchive<BufReader<File>> {
    /// Open a DOCX file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = path.display().to_string();
        let file = File::open(path).map_err(|e| Error::archive(&source, e))?;
        Self::from_reader(BufReader::new(file), source)
    }
}

impl<'a> DocxArchive<Cursor<&'a [u8]>> {
    /// Open a DOCX package held in memory.
    pub fn from_bytes(data: &'a [u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(data), "<bytes>")
    }
}

impl<R: Read + Seek> DocxArchive<R> {
    /// Open a DOCX package from any seekable reader.
    ///
    /// `source` names the input in error messages.
    pub fn from_reader(reader: R, source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let zip = ZipArchive::new(reader)
            .map_err(|e| Error::archive(&source, format!("not a valid zip container ({})", e)))?;
        log::debug!("opened {} ({} entries)", source, zip.len());
        Ok(Self { source, zip })
    }

    /// Name of the input this archive was opened from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of entries in the package.
    pub fn len(&self) -> usize {
        self.zip.len()
    }

    /// Check if the package has no entries.
    pub fn is_empty(&self) -> bool {
        self.zip.len() == 0
    }

    /// Check if the package contains an entry with the given name.
    pub fn contains(&self, name: &str) -> bool {
        self.zip.file_names().any(|n| n == name)
    }

    /// Read a package entry.
    pub fn read_part(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut entry = match self.zip.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => {
                return Err(Error::MissingPart(format!("{} in {}", name, self.source)))
            }
            Err(e) => {
                return Err(Error::archive(
                    &self.source,
                    format!("cannot read {}: {}", name, e),
                ))
            }
        };

        let mut data = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut data).map_err(|e| {
            Error::archive(&self.source, format!("cannot decompress {}: {}", name, e))
        })?;
        Ok(data)
    }

    /// Resolve the name of the main document part.
    ///
    /// The package relationships are consulted first; the conventional
    /// `word/document.xml` is used when they are absent or point nowhere.
    pub fn main_part_name(&mut self) -> Result<String> {
        if self.contains(PACKAGE_RELATIONSHIPS_PART) {
            let rels = self.read_part(PACKAGE_RELATIONSHIPS_PART)?;
            if let Some(target) = office_document_target(&rels) {
                if self.contains(&target) {
                    return Ok(target);
                }
                log::warn!(
                    "{}: package relationship points at missing part {}",
                    self.source,
                    target
                );
            }
        }

        if self.contains(DEFAULT_MAIN_PART) {
            Ok(DEFAULT_MAIN_PART.to_string())
        } else {
            Err(Error::MissingPart(format!(
                "{} in {} (not a DOCX package)",
                DEFAULT_MAIN_PART, self.source
            )))
        }
    }

    /// Read the main document XML.
    pub fn read_main_part(&mut self) -> Result<Vec<u8>> {
        let name = self.main_part_name()?;
        let data = self.read_part(&name)?;
        log::debug!("{}: read {} ({} bytes)", self.source, name, data.len());
        Ok(data)
    }

    /// Read the core properties part, if the package has one.
    pub fn read_core_properties(&mut self) -> Result<Option<Vec<u8>>> {
        if self.contains(CORE_PROPERTIES_PART) {
            self.read_part(CORE_PROPERTIES_PART).map(Some)
        } else {
            Ok(None)
        }
    }
}

/// Find the target of the `officeDocument` relationship in `_rels/.rels`.
fn office_document_target(rels: &[u8]) -> Option<String> {
    let mut reader = Reader::from_reader(rels);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let mut rel_type = None;
                let mut target = None;
                for attr in e.attributes().flatten() {
                    let value = attr.unescape_value().ok().map(|v| v.into_owned());
                    match attr.key.local_name().as_ref() {
                        b"Type" => rel_type = value,
                        b"Target" => target = value,
                        _ => {}
                    }
                }
                if let (Some(rel_type), Some(target)) = (rel_type, target) {
                    if rel_type.ends_with(OFFICE_DOCUMENT_RELATIONSHIP) {
                        return Some(target.trim_start_matches('/').to_string());
                    }
                }
            }
            Ok(Event::Eof) => return None,
            Err(e) => {
                log::warn!("ignoring unreadable package relationships: {}", e);
                return None;
            }
            _ => {}
        }
        buf.clear();
    }
}
