//! DOCX parsing module.

mod archive;
mod docx_parser;
mod options;
mod properties;
mod xml;

pub use archive::{DocxArchive, CORE_PROPERTIES_PART, DEFAULT_MAIN_PART};
pub use docx_parser::DocxParser;
pub use options::{ErrorMode, ExtractMode, ParseOptions};
pub use properties::parse_core_properties;
pub use xml::parse_document_xml;
