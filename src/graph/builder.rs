//! Graph construction from document metadata and chunks.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::chunk::Chunk;
use crate::error::{Error, Result};

use super::classify::{normalize_key, relation_for, FieldClass, FieldClassifier};
use super::model::{Edge, Graph, Node};

/// Label of the single root node.
pub const DOCUMENT_LABEL: &str = "Document";

/// Label of chunk nodes.
pub const CHUNK_LABEL: &str = "Chunk";

/// Relationship from the Document node to each chunk.
pub const CONTAINS_RELATION: &str = "CONTAINS";

/// Document attributes set by the builder itself; metadata keys with these
/// names are stored with a `meta_` prefix.
const DOCUMENT_FIELDS: &[&str] = &["id", "label", "source_path", "name"];

/// Builds a [`Graph`] with one Document node, its metadata relations and its
/// chunks.
///
/// # Example
/// ```
/// use std::collections::HashMap;
/// use undocx::{chunk, ChunkingStrategy, GraphBuilder};
///
/// let metadata = HashMap::from([("keywords".to_string(), "rust, xml".to_string())]);
/// let chunks = chunk("Hello\nWorld", &ChunkingStrategy::ByLine).unwrap();
///
/// let graph = GraphBuilder::new("paper.docx")
///     .with_metadata(&metadata)
///     .with_chunks(&chunks)
///     .build()
///     .unwrap();
///
/// assert_eq!(graph.nodes_with_label("Keywords").count(), 2);
/// assert_eq!(graph.nodes_with_label("Chunk").count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    source_path: PathBuf,
    metadata: Vec<(String, String)>,
    chunks: Vec<Chunk>,
    classifier: FieldClassifier,
}

impl GraphBuilder {
    /// Create a builder for the document at `source_path`.
    pub fn new(source_path: impl AsRef<Path>) -> Self {
        Self {
            source_path: source_path.as_ref().to_path_buf(),
            metadata: Vec::new(),
            chunks: Vec::new(),
            classifier: FieldClassifier::default(),
        }
    }

    /// Add metadata entries.
    ///
    /// Keys are compared trimmed and lowercased, the same way the classifier
    /// looks them up, and stored on the Document node in that form. Entries
    /// whose keys normalize to the same field are merged when the field is
    /// multi-valued; otherwise their values must agree or [`build`] fails.
    ///
    /// [`build`]: GraphBuilder::build
    pub fn with_metadata<K, V>(mut self, metadata: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in metadata {
            let key = key.as_ref();
            if key.trim().is_empty() {
                log::warn!("ignoring metadata entry with an empty key");
                continue;
            }
            self.metadata
                .push((key.to_string(), value.as_ref().to_string()));
        }
        self
    }

    /// Set the chunks to attach to the Document node.
    pub fn with_chunks(mut self, chunks: &[Chunk]) -> Self {
        self.chunks = chunks.to_vec();
        self
    }

    /// Replace the metadata field classifier.
    pub fn with_classifier(mut self, classifier: FieldClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Build the graph.
    ///
    /// Fails with [`crate::Error::Serialization`] if two metadata keys name
    /// the same single-valued field with different values, or if the result
    /// does not pass [`Graph::check_integrity`].
    pub fn build(self) -> Result<Graph> {
        let fields = self.fields()?;
        let mut assembly = Assembly::default();
        let document = assembly.add_node(DOCUMENT_LABEL, self.document_attributes(&fields));

        for (key, value) in &fields {
            match self.classifier.classify(key) {
                FieldClass::Scalar { label } => {
                    let value = value.trim();
                    if value.is_empty() {
                        log::debug!("metadata field {:?} is empty", key);
                        continue;
                    }
                    let target = assembly.canonical_node(label, value);
                    assembly.add_edge(&document, &target, &relation_for(key), BTreeMap::new());
                }
                FieldClass::MultiValued { label } => {
                    let relation = relation_for(key);
                    for item in value.split(',').map(str::trim).filter(|v| !v.is_empty()) {
                        let target = assembly.canonical_node(label, item);
                        assembly.add_edge(&document, &target, &relation, BTreeMap::new());
                    }
                }
                FieldClass::Ignored => {
                    log::debug!("metadata field {:?} kept as a document attribute", key)
                }
            }
        }

        for chunk in &self.chunks {
            let sequence = chunk.id.to_string();
            let attributes = BTreeMap::from([
                ("sequence".to_string(), sequence.clone()),
                ("text".to_string(), chunk.text.clone()),
            ]);
            let node = assembly.add_node(CHUNK_LABEL, attributes);
            let edge_attributes = BTreeMap::from([("sequence".to_string(), sequence)]);
            assembly.add_edge(&document, &node, CONTAINS_RELATION, edge_attributes);
        }

        let graph = assembly.graph;
        graph.check_integrity()?;

        log::debug!(
            "built graph for {}: {} nodes, {} edges",
            self.source_path.display(),
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    /// Group metadata by normalized key, independent of insertion order.
    fn fields(&self) -> Result<BTreeMap<String, String>> {
        let mut groups: BTreeMap<String, Vec<(&str, &str)>> = BTreeMap::new();
        for (key, value) in &self.metadata {
            groups
                .entry(normalize_key(key))
                .or_default()
                .push((key.as_str(), value.as_str()));
        }

        let mut fields = BTreeMap::new();
        for (field, mut entries) in groups {
            entries.sort_unstable();
            let value = match entries.as_slice() {
                [(_, value)] => value.to_string(),
                _ => self.merge(&field, &entries)?,
            };
            fields.insert(field, value);
        }
        Ok(fields)
    }

    fn merge(&self, field: &str, entries: &[(&str, &str)]) -> Result<String> {
        if let FieldClass::MultiValued { .. } = self.classifier.classify(field) {
            let values: Vec<&str> = entries
                .iter()
                .map(|(_, value)| value.trim())
                .filter(|value| !value.is_empty())
                .collect();
            return Ok(values.join(", "));
        }

        let Some(((first_key, first_value), rest)) = entries.split_first() else {
            return Ok(String::new());
        };
        for (key, value) in rest {
            if value.trim() != first_value.trim() {
                return Err(Error::Serialization(format!(
                    "metadata keys {:?} and {:?} both set field {:?} to different values",
                    first_key, key, field
                )));
            }
        }
        Ok(first_value.to_string())
    }

    fn document_attributes(&self, fields: &BTreeMap<String, String>) -> BTreeMap<String, String> {
        let source_path = self.source_path.display().to_string();
        let name = self
            .source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| source_path.clone());

        let is_reserved = |key: &str| DOCUMENT_FIELDS.contains(&key);
        let mut attributes: BTreeMap<String, String> = fields
            .iter()
            .filter(|(key, _)| !is_reserved(key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        // prefix until the name is free of both caller keys and builder fields
        for (key, value) in fields.iter().filter(|(key, _)| is_reserved(key.as_str())) {
            let mut renamed = format!("meta_{}", key);
            while attributes.contains_key(&renamed) || is_reserved(renamed.as_str()) {
                renamed = format!("meta_{}", renamed);
            }
            attributes.insert(renamed, value.clone());
        }

        attributes.insert("source_path".to_string(), source_path);
        attributes.insert("name".to_string(), name);
        attributes
    }
}

/// Graph under construction with node canonicalization and edge dedup.
#[derive(Default)]
struct Assembly {
    graph: Graph,
    /// (label, value) to node id
    canonical: HashMap<(String, String), String>,
    /// (source, target, label) of every edge added so far
    edge_keys: HashSet<(String, String, String)>,
}

impl Assembly {
    fn add_node(&mut self, label: &str, attributes: BTreeMap<String, String>) -> String {
        let id = format!("node-{}", self.graph.nodes.len());
        self.graph.nodes.push(Node {
            id: id.clone(),
            label: label.to_string(),
            attributes,
        });
        id
    }

    /// Return the node for (label, value), creating it on first use.
    fn canonical_node(&mut self, label: &str, value: &str) -> String {
        let key = (label.to_string(), value.to_string());
        if let Some(id) = self.canonical.get(&key) {
            return id.clone();
        }

        let attributes = BTreeMap::from([("name".to_string(), value.to_string())]);
        let id = self.add_node(label, attributes);
        self.canonical.insert(key, id.clone());
        id
    }

    fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        label: &str,
        attributes: BTreeMap<String, String>,
    ) {
        let key = (source.to_string(), target.to_string(), label.to_string());
        if !self.edge_keys.insert(key) {
            return;
        }

        self.graph.edges.push(Edge {
            id: format!("edge-{}", self.graph.edges.len()),
            source: source.to_string(),
            target: target.to_string(),
            label: label.to_string(),
            attributes,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks(texts: &[&str]) -> Vec<Chunk> {
        texts
            .iter()
            .enumerate()
            .map(|(id, text)| Chunk {
                id,
                text: text.to_string(),
            })
            .collect()
    }

    fn metadata(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_build_basic_graph() {
        let meta = metadata(&[
            ("title", "Test Document"),
            ("author", "Ada Lovelace"),
            ("subject", "Computer Science, Mathematics"),
        ]);
        let graph = GraphBuilder::new("/docs/test.docx")
            .with_metadata(&meta)
            .with_chunks(&chunks(&["This is the first line.", "This is the second line."]))
            .build()
            .unwrap();

        assert_eq!(graph.node_count(), 6);
        assert_eq!(graph.nodes_with_label(DOCUMENT_LABEL).count(), 1);
        assert_eq!(graph.nodes_with_label("Author").count(), 1);
        assert_eq!(graph.nodes_with_label("Subject").count(), 2);
        assert_eq!(graph.nodes_with_label(CHUNK_LABEL).count(), 2);
        assert_eq!(graph.nodes_with_label("Title").count(), 0);

        let document = &graph.nodes[0];
        assert_eq!(document.attribute("title"), Some("Test Document"));
        assert_eq!(document.attribute("name"), Some("test.docx"));
        assert_eq!(document.attribute("source_path"), Some("/docs/test.docx"));

        assert_eq!(graph.edges_with_label("HAS_AUTHOR").count(), 1);
        assert_eq!(graph.edges_with_label("HAS_SUBJECT").count(), 2);
        assert_eq!(graph.edges_with_label(CONTAINS_RELATION).count(), 2);
        assert!(graph.edges.iter().all(|e| e.source == document.id));
    }

    #[test]
    fn test_multi_valued_dedup() {
        let meta = metadata(&[("keywords", " AI, ML ,, AI ,  ")]);
        let graph = GraphBuilder::new("k.docx").with_metadata(&meta).build().unwrap();

        let names: Vec<_> = graph
            .nodes_with_label("Keywords")
            .filter_map(|n| n.attribute("name"))
            .collect();
        assert_eq!(names, vec!["AI", "ML"]);
        assert_eq!(graph.edges_with_label("HAS_KEYWORDS").count(), 2);
    }

    #[test]
    fn test_shared_value_nodes() {
        let meta = metadata(&[("subject", "Physics"), ("Subject ", "Physics")]);
        let graph = GraphBuilder::new("s.docx").with_metadata(&meta).build().unwrap();

        assert_eq!(graph.nodes_with_label("Subject").count(), 1);
        assert_eq!(graph.edges_with_label("HAS_SUBJECT").count(), 1);
    }

    #[test]
    fn test_empty_scalar_value() {
        let meta = metadata(&[("journal", "   ")]);
        let graph = GraphBuilder::new("j.docx").with_metadata(&meta).build().unwrap();

        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.nodes[0].attribute("journal"), Some("   "));
    }

    #[test]
    fn test_reserved_metadata_keys() {
        let meta = metadata(&[("name", "custom"), ("id", "42")]);
        let graph = GraphBuilder::new("dir/file.docx").with_metadata(&meta).build().unwrap();

        let document = &graph.nodes[0];
        assert_eq!(document.attribute("name"), Some("file.docx"));
        assert_eq!(document.attribute("meta_name"), Some("custom"));
        assert_eq!(document.attribute("meta_id"), Some("42"));
        assert_eq!(document.id, "node-0");
    }

    #[test]
    fn test_reserved_key_does_not_overwrite_prefixed_key() {
        let meta = metadata(&[("name", "custom"), ("meta_name", "kept")]);
        let graph = GraphBuilder::new("a.docx").with_metadata(&meta).build().unwrap();

        let document = &graph.nodes[0];
        assert_eq!(document.attribute("name"), Some("a.docx"));
        assert_eq!(document.attribute("meta_name"), Some("kept"));
        assert_eq!(document.attribute("meta_meta_name"), Some("custom"));
    }

    #[test]
    fn test_colliding_scalar_keys_conflict() {
        let meta = metadata(&[("journal", "Nature"), ("journal ", "Science")]);
        for _ in 0..16 {
            let err = GraphBuilder::new("j.docx").with_metadata(&meta).build().unwrap_err();
            assert_eq!(
                err.to_string(),
                "serialization error: metadata keys \"journal\" and \"journal \" both set field \"journal\" to different values"
            );
        }
    }

    #[test]
    fn test_colliding_scalar_keys_with_same_value() {
        let meta = metadata(&[("journal", "Nature"), ("Journal", " Nature ")]);
        let graph = GraphBuilder::new("j.docx").with_metadata(&meta).build().unwrap();

        assert_eq!(graph.nodes_with_label("Journal").count(), 1);
        assert_eq!(graph.edges_with_label("HAS_JOURNAL").count(), 1);
        assert_eq!(graph.nodes[0].attribute("journal"), Some(" Nature "));
        assert_eq!(graph.nodes[0].attribute("Journal"), None);
    }

    #[test]
    fn test_colliding_multi_valued_keys_merge() {
        let entries = [("Keywords", "ML, NLP"), ("keywords", "AI, ML")];
        let forward = GraphBuilder::new("k.docx").with_metadata(entries).build().unwrap();
        let backward = GraphBuilder::new("k.docx")
            .with_metadata(entries.iter().rev().copied())
            .build()
            .unwrap();
        assert_eq!(forward, backward);

        let names: Vec<_> = forward
            .nodes_with_label("Keywords")
            .filter_map(|n| n.attribute("name"))
            .collect();
        assert_eq!(names, vec!["ML", "NLP", "AI"]);
        assert_eq!(forward.edges_with_label("HAS_KEYWORDS").count(), 3);
        assert_eq!(forward.nodes[0].attribute("keywords"), Some("ML, NLP, AI, ML"));
    }

    #[test]
    fn test_chunk_sequence() {
        let graph = GraphBuilder::new("c.docx")
            .with_chunks(&chunks(&["a", "b", "c"]))
            .build()
            .unwrap();

        for (i, node) in graph.nodes_with_label(CHUNK_LABEL).enumerate() {
            assert_eq!(node.attribute("sequence"), Some(i.to_string().as_str()));
        }
        let sequences: Vec<_> = graph
            .edges_with_label(CONTAINS_RELATION)
            .filter_map(|e| e.attribute("sequence"))
            .collect();
        assert_eq!(sequences, vec!["0", "1", "2"]);
    }

    #[test]
    fn test_custom_classifier() {
        let meta = metadata(&[("journal", "Nature"), ("editors", "Kim, Lee")]);
        let classifier = FieldClassifier::default()
            .with_field("journal", FieldClass::Ignored)
            .multi_valued("editors");
        let graph = GraphBuilder::new("x.docx")
            .with_metadata(&meta)
            .with_classifier(classifier)
            .build()
            .unwrap();

        assert_eq!(graph.nodes_with_label("Journal").count(), 0);
        assert_eq!(graph.nodes_with_label("Editors").count(), 2);
    }

    #[test]
    fn test_build_is_deterministic() {
        let meta = metadata(&[
            ("tags", "b, a"),
            ("publisher", "ACM"),
            ("keywords", "x, y"),
            ("language", "en"),
        ]);
        let build = || {
            GraphBuilder::new("d.docx")
                .with_metadata(&meta)
                .with_chunks(&chunks(&["one", "two"]))
                .build()
                .unwrap()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_document_only() {
        let graph = GraphBuilder::new("empty.docx").build().unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.check_integrity().is_ok());
    }
}
