//! Graph types.

use std::collections::{BTreeMap, HashSet};

use crate::error::{Error, Result};

/// Attribute names a node may not carry; they are emitted as node fields.
pub const RESERVED_NODE_KEYS: &[&str] = &["id", "label"];

/// Attribute names an edge may not carry; they are emitted as edge fields.
pub const RESERVED_EDGE_KEYS: &[&str] = &["id", "source", "target", "label"];

/// A labeled node with string attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Unique node identifier
    pub id: String,

    /// Node type, e.g. `Document` or `Chunk`
    pub label: String,

    /// Attributes, ordered by name
    pub attributes: BTreeMap<String, String>,
}

impl Node {
    /// Get an attribute value.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// A directed, labeled edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// Unique edge identifier
    pub id: String,

    /// Source node id
    pub source: String,

    /// Target node id
    pub target: String,

    /// Relationship type, e.g. `CONTAINS`
    pub label: String,

    /// Attributes, ordered by name
    pub attributes: BTreeMap<String, String>,
}

impl Edge {
    /// Get an attribute value.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// A property graph: nodes and edges in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    /// Nodes in creation order
    pub nodes: Vec<Node>,

    /// Edges in creation order
    pub edges: Vec<Edge>,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Find a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Iterate over nodes with the given label.
    pub fn nodes_with_label<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes.iter().filter(move |n| n.label == label)
    }

    /// Iterate over edges with the given label.
    pub fn edges_with_label<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.label == label)
    }

    /// Iterate over edges leaving the given node.
    pub fn edges_from<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.source == id)
    }

    /// Verify structural integrity.
    ///
    /// Node and edge ids must be unique, every edge endpoint must name an
    /// existing node and no attribute may shadow a reserved field.
    pub fn check_integrity(&self) -> Result<()> {
        let mut node_ids = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !node_ids.insert(node.id.as_str()) {
                return Err(Error::Serialization(format!("duplicate node id {}", node.id)));
            }
            if let Some(key) = reserved_key(&node.attributes, RESERVED_NODE_KEYS) {
                return Err(Error::Serialization(format!(
                    "node {} has reserved attribute {:?}",
                    node.id, key
                )));
            }
        }

        let mut edge_ids = HashSet::with_capacity(self.edges.len());
        for edge in &self.edges {
            if !edge_ids.insert(edge.id.as_str()) {
                return Err(Error::Serialization(format!("duplicate edge id {}", edge.id)));
            }
            for endpoint in [&edge.source, &edge.target] {
                if !node_ids.contains(endpoint.as_str()) {
                    return Err(Error::Serialization(format!(
                        "edge {} references unknown node {}",
                        edge.id, endpoint
                    )));
                }
            }
            if let Some(key) = reserved_key(&edge.attributes, RESERVED_EDGE_KEYS) {
                return Err(Error::Serialization(format!(
                    "edge {} has reserved attribute {:?}",
                    edge.id, key
                )));
            }
        }

        Ok(())
    }
}

fn reserved_key<'a>(attributes: &'a BTreeMap<String, String>, reserved: &[&str]) -> Option<&'a str> {
    attributes
        .keys()
        .map(String::as_str)
        .find(|key| reserved.contains(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, label: &str) -> Node {
        Node {
            id: id.to_string(),
            label: label.to_string(),
            attributes: BTreeMap::new(),
        }
    }

    fn edge(id: &str, source: &str, target: &str) -> Edge {
        Edge {
            id: id.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            label: "CONTAINS".to_string(),
            attributes: BTreeMap::new(),
        }
    }

    #[test]
    fn test_valid_graph() {
        let graph = Graph {
            nodes: vec![node("node-0", "Document"), node("node-1", "Chunk")],
            edges: vec![edge("edge-0", "node-0", "node-1")],
        };
        assert!(graph.check_integrity().is_ok());
        assert_eq!(graph.nodes_with_label("Chunk").count(), 1);
        assert_eq!(graph.edges_from("node-0").count(), 1);
        assert_eq!(graph.node("node-1").unwrap().label, "Chunk");
    }

    #[test]
    fn test_dangling_edge() {
        let graph = Graph {
            nodes: vec![node("node-0", "Document")],
            edges: vec![edge("edge-0", "node-0", "node-9")],
        };
        let err = graph.check_integrity().unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
        assert!(err.to_string().contains("node-9"));
    }

    #[test]
    fn test_duplicate_ids() {
        let graph = Graph {
            nodes: vec![node("node-0", "Document"), node("node-0", "Chunk")],
            edges: vec![],
        };
        assert!(graph.check_integrity().is_err());

        let graph = Graph {
            nodes: vec![node("node-0", "Document"), node("node-1", "Chunk")],
            edges: vec![edge("edge-0", "node-0", "node-1"), edge("edge-0", "node-0", "node-1")],
        };
        assert!(graph.check_integrity().is_err());
    }

    #[test]
    fn test_reserved_attribute() {
        let mut bad = node("node-0", "Document");
        bad.attributes.insert("label".to_string(), "oops".to_string());
        let graph = Graph {
            nodes: vec![bad],
            edges: vec![],
        };
        assert!(graph.check_integrity().is_err());
    }
}
