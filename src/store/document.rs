//! Schema-less documents as the store sees them

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Field map of a document, in insertion order
pub type Fields = IndexMap<String, FieldValue>;

/// A scalar field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl FieldValue {
    /// Strip surrounding whitespace from text values; other values unchanged
    pub fn trimmed(self) -> Self {
        match self {
            FieldValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.len() == s.len() {
                    FieldValue::Text(s)
                } else {
                    FieldValue::Text(trimmed.to_string())
                }
            }
            other => other,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(value.into())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value.into())
    }
}

/// Store-generated document identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for DocumentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

// Identifiers leave the process as plain strings
impl Serialize for DocumentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub fields: Fields,
}

/// Equality filter on one field, optionally skipping one document
#[derive(Debug, Clone)]
pub struct Filter {
    pub field: String,
    pub value: FieldValue,
    pub exclude_id: Option<DocumentId>,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            exclude_id: None,
        }
    }

    pub fn excluding(mut self, id: DocumentId) -> Self {
        self.exclude_id = Some(id);
        self
    }

    pub fn matches(&self, id: &DocumentId, fields: &Fields) -> bool {
        if self.exclude_id.as_ref() == Some(id) {
            return false;
        }
        fields.get(&self.field) == Some(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_value_accepts_scalars_only() {
        let fields: Fields =
            serde_json::from_value(json!({"a": null, "b": true, "c": 1.5, "d": "x"})).unwrap();
        assert_eq!(fields["a"], FieldValue::Null);
        assert_eq!(fields["b"], FieldValue::Bool(true));
        assert!(matches!(fields["c"], FieldValue::Number(_)));
        assert_eq!(fields["d"], FieldValue::from("x"));

        assert!(serde_json::from_value::<Fields>(json!({"tags": ["a"]})).is_err());
        assert!(serde_json::from_value::<Fields>(json!({"nested": {"a": 1}})).is_err());
        assert!(serde_json::from_value::<Fields>(json!(["not", "an", "object"])).is_err());
    }

    #[test]
    fn test_field_order_is_preserved() {
        let fields: Fields = serde_json::from_str(r#"{"z":1,"a":2,"m":3}"#).unwrap();
        let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn test_trimmed() {
        assert_eq!(FieldValue::from("  hi \n").trimmed(), FieldValue::from("hi"));
        assert_eq!(FieldValue::from(7).trimmed(), FieldValue::from(7));
        assert_eq!(FieldValue::Null.trimmed(), FieldValue::Null);
    }

    #[test]
    fn test_document_id_round_trips_through_strings() {
        let id = DocumentId::generate();
        let text = id.to_string();
        assert_eq!(text.parse::<DocumentId>().unwrap(), id);
        assert_eq!(serde_json::to_value(id).unwrap(), json!(text));
        assert!("nonexistent-id".parse::<DocumentId>().is_err());
        assert!("".parse::<DocumentId>().is_err());
    }

    #[test]
    fn test_filter_matches_and_excludes() {
        let id = DocumentId::generate();
        let mut fields = Fields::new();
        fields.insert("email".into(), "a@x.com".into());

        let filter = Filter::eq("email", "a@x.com");
        assert!(filter.matches(&id, &fields));
        assert!(!Filter::eq("email", "b@x.com").matches(&id, &fields));
        assert!(!filter.excluding(id).matches(&id, &fields));
    }
}
