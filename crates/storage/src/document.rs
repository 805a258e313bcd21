//! Raw documents as the store returns them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A keyed, untyped document. Decoding into typed values happens upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Store-assigned document key
    pub id: String,

    /// Field values
    pub fields: Map<String, Value>,

    /// Why the stored body could not be read, if it could not
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unreadable: Option<String>,
}

impl Document {
    /// Create an empty document.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
            unreadable: None,
        }
    }

    /// A document whose stored body could not be decoded.
    pub fn unreadable(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            unreadable: Some(reason.into()),
            ..Self::new(id)
        }
    }

    /// Create a document from a JSON value. Non-object values carry no fields.
    pub fn from_value(id: impl Into<String>, value: Value) -> Self {
        let fields = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            id: id.into(),
            fields,
            unreadable: None,
        }
    }

    /// Set a field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Look up a field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_object() {
        let doc = Document::from_value("thesis", json!({"projectDueDate": 1700000000}));
        assert_eq!(doc.id, "thesis");
        assert_eq!(doc.get("projectDueDate"), Some(&json!(1700000000)));
    }

    #[test]
    fn test_from_value_non_object() {
        let doc = Document::from_value("broken", json!([1, 2, 3]));
        assert!(doc.fields.is_empty());
    }

    #[test]
    fn test_unreadable_keeps_reason() {
        let doc = Document::unreadable("corrupt", "EOF while parsing");
        assert_eq!(doc.id, "corrupt");
        assert!(doc.fields.is_empty());
        assert_eq!(doc.unreadable.as_deref(), Some("EOF while parsing"));
    }
}
