//! Helpers for building DOCX packages in tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::PathBuf;

use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Builds a DOCX package from a body XML fragment.
pub struct DocxBuilder {
    body: String,
    core: Option<String>,
    extra: Vec<(String, String)>,
    include_document: bool,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self {
            body: String::new(),
            core: None,
            extra: Vec::new(),
            include_document: true,
        }
    }

    pub fn paragraph(mut self, text: &str) -> Self {
        self.body.push_str(&paragraph(text));
        self
    }

    pub fn table(mut self, rows: &[&[&str]]) -> Self {
        self.body.push_str(&table(rows));
        self
    }

    pub fn raw(mut self, xml: &str) -> Self {
        self.body.push_str(xml);
        self
    }

    pub fn core_properties(mut self, xml: &str) -> Self {
        self.core = Some(xml.to_string());
        self
    }

    pub fn part(mut self, name: &str, content: &str) -> Self {
        self.extra.push((name.to_string(), content.to_string()));
        self
    }

    pub fn without_document(mut self) -> Self {
        self.include_document = false;
        self
    }

    pub fn document_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{}"><w:body>{}</w:body></w:document>"#,
            W_NS, self.body
        )
    }

    pub fn build(&self) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        writer.start_file("[Content_Types].xml", options).unwrap();
        writer.write_all(b"<Types/>").unwrap();

        if self.include_document {
            writer.start_file("word/document.xml", options).unwrap();
            writer.write_all(self.document_xml().as_bytes()).unwrap();
        }
        if let Some(core) = &self.core {
            writer.start_file("docProps/core.xml", options).unwrap();
            writer.write_all(core.as_bytes()).unwrap();
        }
        for (name, content) in &self.extra {
            writer.start_file(name.as_str(), options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }

        writer.finish().unwrap().into_inner()
    }

    /// Write the package into a fresh temp dir. Keep the `TempDir` alive.
    pub fn write(&self, name: &str) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, self.build()).unwrap();
        (dir, path)
    }
}

pub fn paragraph(text: &str) -> String {
    format!(
        r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        text
    )
}

pub fn table(rows: &[&[&str]]) -> String {
    let mut xml = String::from("<w:tbl>");
    for row in rows {
        xml.push_str("<w:tr>");
        for cell in row.iter() {
            xml.push_str("<w:tc>");
            xml.push_str(&paragraph(cell));
            xml.push_str("</w:tc>");
        }
        xml.push_str("</w:tr>");
    }
    xml.push_str("</w:tbl>");
    xml
}
