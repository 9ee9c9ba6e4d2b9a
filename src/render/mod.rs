//! Rendering module for converting documents and graphs to output formats.

mod json;
mod options;
mod text;

pub use json::{to_json, JsonFormat};
pub use options::{ExtractionOrder, TextOptions};
pub use text::{text_units, to_text};
