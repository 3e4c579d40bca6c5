//! Index document type for the search service.
//!
//! This module defines the flat key/value document that is pushed to an index.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Flat document representation pushed to a search index.
///
/// A document is a transient projection of one host record: it is rebuilt on
/// every sync and has no lifecycle of its own. Every document carries a string
/// `id` field, because the service only accepts string primary keys.
///
/// # Example
///
/// ```
/// use meili_sync_shared::IndexDocument;
///
/// let doc = IndexDocument::new("42")
///     .with_field("lot_name", "LOT-2024/07")
///     .with_field("sku", "");
///
/// assert_eq!(doc.id(), Some("42"));
/// assert_eq!(doc.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexDocument {
    fields: Map<String, Value>,
}

impl IndexDocument {
    /// Name of the mandatory primary key field.
    pub const ID_FIELD: &'static str = "id";

    /// Create a document holding only the mandatory `id` field.
    pub fn new(id: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(Self::ID_FIELD.to_string(), Value::String(id.into()));
        Self { fields }
    }

    /// Set a field, replacing any previous value under the same name.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a field in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// The document's primary key, if it is a string.
    pub fn id(&self) -> Option<&str> {
        self.fields.get(Self::ID_FIELD).and_then(Value::as_str)
    }

    /// Look up a field value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Look up a field holding a string value.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// All fields of the document.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Number of fields, including `id`.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false for documents built through [`IndexDocument::new`].
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
