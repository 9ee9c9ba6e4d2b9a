//! Metadata field classification.
//!
//! Decides which metadata keys become related nodes of the Document node and
//! how their values are split.

use std::collections::BTreeMap;

/// How a metadata field is turned into graph structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldClass {
    /// The whole trimmed value becomes one node with the given label
    Scalar {
        /// Label of the related node
        label: String,
    },

    /// The value is split on commas; each distinct item becomes a node
    MultiValued {
        /// Label of the related nodes
        label: String,
    },

    /// The field stays a Document attribute only
    Ignored,
}

static IGNORED: FieldClass = FieldClass::Ignored;

const SCALAR_FIELDS: &[&str] = &["journal", "publisher", "author", "language", "conference"];
const MULTI_VALUED_FIELDS: &[&str] = &["keywords", "subjects", "subject", "authors", "categories", "tags"];

/// Maps metadata keys to [`FieldClass`]es.
///
/// Keys are matched case-insensitively after trimming. Unknown keys are
/// [`FieldClass::Ignored`].
#[derive(Debug, Clone)]
pub struct FieldClassifier {
    fields: BTreeMap<String, FieldClass>,
}

impl FieldClassifier {
    /// Create a classifier that ignores every field.
    pub fn empty() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    /// Classify `key` as a scalar field.
    pub fn scalar(self, key: &str) -> Self {
        let label = label_for(key);
        self.with_field(key, FieldClass::Scalar { label })
    }

    /// Classify `key` as a multi-valued field.
    pub fn multi_valued(self, key: &str) -> Self {
        let label = label_for(key);
        self.with_field(key, FieldClass::MultiValued { label })
    }

    /// Set the class of `key`, replacing any previous entry.
    pub fn with_field(mut self, key: &str, class: FieldClass) -> Self {
        self.fields.insert(normalize_key(key), class);
        self
    }

    /// Look up the class of a metadata key.
    pub fn classify(&self, key: &str) -> &FieldClass {
        self.fields.get(&normalize_key(key)).unwrap_or(&IGNORED)
    }
}

impl Default for FieldClassifier {
    /// Bibliographic defaults: `journal`, `publisher`, `author`, `language`
    /// and `conference` are scalar; `keywords`, `subjects`, `subject`,
    /// `authors`, `categories` and `tags` are multi-valued.
    fn default() -> Self {
        let classifier = SCALAR_FIELDS
            .iter()
            .fold(Self::empty(), |c, key| c.scalar(key));
        MULTI_VALUED_FIELDS
            .iter()
            .fold(classifier, |c, key| c.multi_valued(key))
    }
}

/// Relationship label for edges created from `key`, e.g. `HAS_SUBJECTS`.
pub fn relation_for(key: &str) -> String {
    let mut relation = String::from("HAS_");
    for c in normalize_key(key).chars() {
        if c.is_alphanumeric() {
            relation.extend(c.to_uppercase());
        } else {
            relation.push('_');
        }
    }
    relation
}

/// Node label derived from a key: the trimmed key with its first letter
/// capitalized, e.g. `subjects` becomes `Subjects`.
pub fn label_for(key: &str) -> String {
    let key = normalize_key(key);
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Trimmed, lowercased form under which metadata keys are compared.
pub(crate) fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}
