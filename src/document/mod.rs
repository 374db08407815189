//! Documents and field access.
//!
//! The index never looks at document shape directly. It reads field text
//! through [`FieldSource`] and projects documents to one text blob with a
//! [`Projection`].

pub mod loader;
pub mod projection;

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use projection::{ProjectedField, Projection};

/// Separator of nested list accessors: `"_splits[].oper_nm"`
pub const LIST_ACCESSOR: &str = "[].";

/// Field name holding the external document key
pub const KEY_FIELD: &str = "id";

/// Read access to the text of named fields.
///
/// Missing, null and empty fields return `None`; they contribute nothing to
/// indexing or suggestions.
pub trait FieldSource {
    fn field_text(&self, accessor: &str) -> Option<Cow<'_, str>>;

    /// Externally meaningful key, used to join results back to their origin
    fn doc_key(&self) -> Option<Cow<'_, str>> {
        self.field_text(KEY_FIELD)
    }
}

/// A flattened experiment row (experiment fields joined with project fields,
/// Split Table rows optionally nested as an array of objects).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    pub fn new() -> Self {
        Document(Map::new())
    }

    /// Wrap a JSON value; only objects are documents
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Document(map)),
            _ => None,
        }
    }

    /// Set a field, builder style
    pub fn with<V: Into<Value>>(mut self, field: &str, value: V) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert<V: Into<Value>>(&mut self, field: &str, value: V) -> Option<Value> {
        self.0.insert(field.to_string(), value.into())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Document(map)
    }
}

impl FieldSource for Document {
    fn field_text(&self, accessor: &str) -> Option<Cow<'_, str>> {
        match accessor.split_once(LIST_ACCESSOR) {
            Some((list, field)) => nested_text(self.0.get(list)?, field),
            None => value_text(self.0.get(accessor)?),
        }
    }
}

/// Text of a scalar JSON value
fn value_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) if !s.is_empty() => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        _ => None,
    }
}

/// `field` of every object in a JSON array, space separated
fn nested_text<'a>(list: &'a Value, field: &str) -> Option<Cow<'a, str>> {
    let rows = list.as_array()?;
    let parts: Vec<Cow<'a, str>> = rows
        .iter()
        .filter_map(|row| row.get(field))
        .filter_map(value_text)
        .collect();
    match parts.len() {
        0 => None,
        1 => parts.into_iter().next(),
        _ => Some(Cow::Owned(parts.join(" "))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn doc(value: Value) -> Document {
        Document::from_value(value).unwrap()
    }

    #[test]
    fn scalar_fields_render_as_text() {
        let d = doc(json!({
            "eval_item": "CMP Dishing",
            "wafer_count": 25,
            "urgent": true,
            "note": null,
            "empty": ""
        }));
        assert_eq!(d.field_text("eval_item").as_deref(), Some("CMP Dishing"));
        assert_eq!(d.field_text("wafer_count").as_deref(), Some("25"));
        assert_eq!(d.field_text("urgent").as_deref(), Some("true"));
        assert_eq!(d.field_text("note"), None);
        assert_eq!(d.field_text("empty"), None);
        assert_eq!(d.field_text("missing"), None);
    }

    #[test]
    fn nested_list_fields_are_joined() {
        let d = doc(json!({
            "_splits": [
                { "oper_nm": "CMP", "eqp_id": "EQ1" },
                { "oper_nm": "Clean" },
                { "oper_nm": null }
            ]
        }));
        assert_eq!(d.field_text("_splits[].oper_nm").as_deref(), Some("CMP Clean"));
        assert_eq!(d.field_text("_splits[].eqp_id").as_deref(), Some("EQ1"));
        assert_eq!(d.field_text("_splits[].recipe_id"), None);
        assert_eq!(d.field_text("missing[].x"), None);
    }

    #[test]
    fn key_defaults_to_id_field() {
        let d = Document::new().with("id", 42).with("eval_item", "x");
        assert_eq!(d.doc_key().as_deref(), Some("42"));
        assert_eq!(Document::new().doc_key(), None);
    }

    #[test]
    fn only_objects_become_documents() {
        assert!(Document::from_value(json!([1, 2])).is_none());
        assert!(Document::from_value(json!("text")).is_none());
    }
}
