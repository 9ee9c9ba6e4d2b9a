//! ZIP/DOCX format detection and validation.

use crate::error::{Error, Result};
use crate::parser::DocxArchive;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// ZIP container signature information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZipFormat {
    /// Archive starting with a local file header (`PK\x03\x04`)
    Standard,
    /// Archive consisting only of an end-of-central-directory record (`PK\x05\x06`)
    Empty,
}

impl std::fmt::Display for ZipFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZipFormat::Standard => write!(f, "ZIP"),
            ZipFormat::Empty => write!(f, "ZIP (empty)"),
        }
    }
}

const LOCAL_FILE_MAGIC: &[u8] = b"PK\x03\x04";
const EMPTY_ARCHIVE_MAGIC: &[u8] = b"PK\x05\x06";
const MAGIC_LEN: usize = 4;

/// Detect the container format from a file path.
///
/// # Example
/// ```no_run
/// use undocx::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("report.docx").unwrap();
/// println!("container: {}", format);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<ZipFormat> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let file = File::open(path).map_err(|e| Error::archive(&display, e))?;
    let mut reader = BufReader::new(file);
    let mut header = [0u8; MAGIC_LEN];
    reader
        .read_exact(&mut header)
        .map_err(|_| Error::archive(&display, "file is too short to be a zip container"))?;
    detect_format_from_bytes(&header).map_err(|_| Error::archive(display, "not a zip container"))
}

/// Detect the container format from the leading bytes of a file.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<ZipFormat> {
    if data.len() < MAGIC_LEN {
        return Err(Error::archive("<bytes>", "data is too short to be a zip container"));
    }

    if data.starts_with(LOCAL_FILE_MAGIC) {
        Ok(ZipFormat::Standard)
    } else if data.starts_with(EMPTY_ARCHIVE_MAGIC) {
        Ok(ZipFormat::Empty)
    } else {
        Err(Error::archive("<bytes>", "not a zip container"))
    }
}

/// Check if bytes start with a zip signature.
pub fn is_zip_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}

/// Check if a file is a zip container holding a WordprocessingML main part.
pub fn is_docx<P: AsRef<Path>>(path: P) -> bool {
    match DocxArchive::open(path) {
        Ok(mut archive) => archive.main_part_name().is_ok(),
        Err(_) => false,
    }
}
