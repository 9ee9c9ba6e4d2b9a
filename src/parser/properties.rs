//! Core properties (`docProps/core.xml`).

use chrono::{DateTime, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::model::Metadata;

/// Parse the core properties part into [`Metadata`].
///
/// Elements are matched by local name; unknown properties are ignored.
/// Dates that are not RFC 3339 timestamps are dropped with a warning.
pub fn parse_core_properties(data: &[u8]) -> Result<Metadata> {
    let mut reader = Reader::from_reader(data);
    let mut buf = Vec::new();
    let mut metadata = Metadata::default();
    let mut current: Option<Vec<u8>> = None;
    let mut text = String::new();

    loop {
        let position = reader.buffer_position();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                current = Some(e.local_name().as_ref().to_vec());
                text.clear();
            }
            Ok(Event::Text(e)) => {
                if current.is_some() {
                    let value = e.unescape().map_err(|err| {
                        Error::MalformedXml(format!("core properties at byte {}: {}", position, err))
                    })?;
                    text.push_str(&value);
                }
            }
            Ok(Event::End(_)) => {
                if let Some(name) = current.take() {
                    assign(&mut metadata, &name, text.trim());
                }
                text.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::MalformedXml(format!(
                    "core properties at byte {}: {}",
                    position, e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(metadata)
}

fn assign(metadata: &mut Metadata, name: &[u8], value: &str) {
    if value.is_empty() {
        return;
    }

    let owned = || Some(value.to_string());
    match name {
        b"title" => metadata.title = owned(),
        b"subject" => metadata.subject = owned(),
        b"creator" => metadata.creator = owned(),
        b"keywords" => metadata.keywords = owned(),
        b"description" => metadata.description = owned(),
        b"lastModifiedBy" => metadata.last_modified_by = owned(),
        b"revision" => metadata.revision = owned(),
        b"created" => metadata.created = parse_date(value),
        b"modified" => metadata.modified = parse_date(value),
        _ => {}
    }
}

fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(value) {
        Ok(date) => Some(date.with_timezone(&Utc)),
        Err(e) => {
            log::warn!("ignoring core property date {:?}: {}", value, e);
            None
        }
    }
}
