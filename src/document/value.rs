//! The generic `Document` tree
//!
//! Supported shapes:
//! - null
//! - boolean
//! - number (integer or decimal, JSON semantics)
//! - string
//! - sequence of documents
//! - mapping from string key to document (insertion ordered)

use serde_json::{Number, Value};

use super::errors::{DocumentError, DocumentResult};
use super::map::DocumentMap;

/// Untyped, recursively nested representation of a JSON document.
///
/// Loaded payloads live in this form while they are migrated; they are
/// bound into typed records only afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Document {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Sequence(Vec<Document>),
    Mapping(DocumentMap),
}

impl Document {
    /// Parses JSON text into a document.
    pub fn parse(text: &str) -> DocumentResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Document::from(value))
    }

    /// Renders the document as compact JSON text.
    pub fn to_json_string(&self) -> String {
        Value::from(self.clone()).to_string()
    }

    /// Renders the document as indented JSON text.
    pub fn to_json_string_pretty(&self) -> DocumentResult<String> {
        Ok(serde_json::to_string_pretty(&Value::from(self.clone()))?)
    }

    /// Creates an empty mapping document.
    pub fn mapping() -> Self {
        Document::Mapping(DocumentMap::new())
    }

    /// Returns the shape name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Document::Null => "null",
            Document::Bool(_) => "boolean",
            Document::Number(_) => "number",
            Document::String(_) => "string",
            Document::Sequence(_) => "sequence",
            Document::Mapping(_) => "mapping",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Document::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Document::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Document::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Document::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Document::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Document::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Vec<Document>> {
        match self {
            Document::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_sequence_mut(&mut self) -> Option<&mut Vec<Document>> {
        match self {
            Document::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&DocumentMap> {
        match self {
            Document::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut DocumentMap> {
        match self {
            Document::Mapping(map) => Some(map),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Field helpers for migration handlers
    // ------------------------------------------------------------------

    fn require_mapping(&self) -> DocumentResult<&DocumentMap> {
        let found = self.type_name();
        self.as_mapping()
            .ok_or(DocumentError::NotAMapping { found })
    }

    fn require_mapping_mut(&mut self) -> DocumentResult<&mut DocumentMap> {
        let found = self.type_name();
        self.as_mapping_mut()
            .ok_or(DocumentError::NotAMapping { found })
    }

    /// Returns a field, failing if this is not a mapping or the field is absent.
    pub fn field(&self, name: &str) -> DocumentResult<&Document> {
        self.require_mapping()?
            .get(name)
            .ok_or_else(|| DocumentError::MissingField(name.to_string()))
    }

    pub fn field_mut(&mut self, name: &str) -> DocumentResult<&mut Document> {
        self.require_mapping_mut()?
            .get_mut(name)
            .ok_or_else(|| DocumentError::MissingField(name.to_string()))
    }

    /// Returns a string field.
    pub fn require_str(&self, name: &str) -> DocumentResult<&str> {
        let value = self.field(name)?;
        value
            .as_str()
            .ok_or_else(|| DocumentError::type_mismatch(name, "string", value.type_name()))
    }

    /// Returns an integer field.
    pub fn require_i64(&self, name: &str) -> DocumentResult<i64> {
        let value = self.field(name)?;
        value
            .as_i64()
            .ok_or_else(|| DocumentError::type_mismatch(name, "integer", value.type_name()))
    }

    /// Removes a field and returns its value.
    pub fn take_field(&mut self, name: &str) -> DocumentResult<Document> {
        self.require_mapping_mut()?
            .remove(name)
            .ok_or_else(|| DocumentError::MissingField(name.to_string()))
    }

    /// Sets a field, returning the previous value if any.
    pub fn set_field(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Document>,
    ) -> DocumentResult<Option<Document>> {
        Ok(self.require_mapping_mut()?.insert(name, value.into()))
    }

    /// Renames a field in place.
    pub fn rename_field(&mut self, from: &str, to: impl Into<String>) -> DocumentResult<()> {
        self.require_mapping_mut()?.rename(from, to)
    }
}

// ----------------------------------------------------------------------
// Conversions
// ----------------------------------------------------------------------

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Document::Null,
            Value::Bool(b) => Document::Bool(b),
            Value::Number(n) => Document::Number(n),
            Value::String(s) => Document::String(s),
            Value::Array(items) => {
                Document::Sequence(items.into_iter().map(Document::from).collect())
            }
            Value::Object(map) => Document::Mapping(
                map.into_iter()
                    .map(|(k, v)| (k, Document::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        match doc {
            Document::Null => Value::Null,
            Document::Bool(b) => Value::Bool(b),
            Document::Number(n) => Value::Number(n),
            Document::String(s) => Value::String(s),
            Document::Sequence(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            Document::Mapping(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Document {
    fn from(b: bool) -> Self {
        Document::Bool(b)
    }
}

impl From<i64> for Document {
    fn from(n: i64) -> Self {
        Document::Number(n.into())
    }
}

impl From<i32> for Document {
    fn from(n: i32) -> Self {
        Document::Number(n.into())
    }
}

impl From<u64> for Document {
    fn from(n: u64) -> Self {
        Document::Number(n.into())
    }
}

impl From<&str> for Document {
    fn from(s: &str) -> Self {
        Document::String(s.to_string())
    }
}

impl From<String> for Document {
    fn from(s: String) -> Self {
        Document::String(s)
    }
}

impl From<Vec<Document>> for Document {
    fn from(items: Vec<Document>) -> Self {
        Document::Sequence(items)
    }
}

impl From<DocumentMap> for Document {
    fn from(map: DocumentMap) -> Self {
        Document::Mapping(map)
    }
}
