//! JSON serialization of graphs.
//!
//! Nodes are written as `{"id", "label", ...attributes}` and edges as
//! `{"id", "source", "target", "label", ...attributes}`, in creation order.

use serde::ser::{Serialize, SerializeMap, SerializeStruct, Serializer};

use crate::error::{Error, Result};
use crate::graph::{Edge, Graph, Node};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a graph to JSON.
///
/// The graph is checked with [`Graph::check_integrity`] first, so a broken
/// graph is reported instead of written.
pub fn to_json(graph: &Graph, format: JsonFormat) -> Result<String> {
    graph.check_integrity()?;

    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(graph),
        JsonFormat::Compact => serde_json::to_string(graph),
    };

    result.map_err(|e| Error::Serialization(format!("JSON serialization error: {}", e)))
}

impl Serialize for Graph {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Graph", 2)?;
        state.serialize_field("nodes", &self.nodes)?;
        state.serialize_field("edges", &self.edges)?;
        state.end()
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2 + self.attributes.len()))?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("label", &self.label)?;
        for (key, value) in &self.attributes {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for Edge {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4 + self.attributes.len()))?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("source", &self.source)?;
        map.serialize_entry("target", &self.target)?;
        map.serialize_entry("label", &self.label)?;
        for (key, value) in &self.attributes {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn graph() -> Graph {
        Graph {
            nodes: vec![
                Node {
                    id: "node-0".to_string(),
                    label: "Document".to_string(),
                    attributes: BTreeMap::from([("name".to_string(), "a.docx".to_string())]),
                },
                Node {
                    id: "node-1".to_string(),
                    label: "Chunk".to_string(),
                    attributes: BTreeMap::from([
                        ("sequence".to_string(), "0".to_string()),
                        ("text".to_string(), "Hello \"world\"".to_string()),
                    ]),
                },
            ],
            edges: vec![Edge {
                id: "edge-0".to_string(),
                source: "node-0".to_string(),
                target: "node-1".to_string(),
                label: "CONTAINS".to_string(),
                attributes: BTreeMap::from([("sequence".to_string(), "0".to_string())]),
            }],
        }
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&graph(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
        assert_eq!(
            json,
            concat!(
                r#"{"nodes":[{"id":"node-0","label":"Document","name":"a.docx"},"#,
                r#"{"id":"node-1","label":"Chunk","sequence":"0","text":"Hello \"world\""}],"#,
                r#""edges":[{"id":"edge-0","source":"node-0","target":"node-1","label":"CONTAINS","sequence":"0"}]}"#
            )
        );
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&graph(), JsonFormat::Pretty).unwrap();
        assert!(json.contains('\n'));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["nodes"][1]["text"], "Hello \"world\"");
        assert_eq!(value["edges"][0]["label"], "CONTAINS");
    }

    #[test]
    fn test_to_json_rejects_broken_graph() {
        let mut broken = graph();
        broken.edges[0].target = "node-7".to_string();
        let err = to_json(&broken, JsonFormat::Compact).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_empty_graph() {
        let json = to_json(&Graph::new(), JsonFormat::Compact).unwrap();
        assert_eq!(json, r#"{"nodes":[],"edges":[]}"#);
    }
}
