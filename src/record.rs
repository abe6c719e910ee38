//! Open attribute records for results without a dedicated entity type.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A labelled bag of attributes.
///
/// Used for news items, studio search results, featured studios and
/// similar payloads. The label is rendered once from a template such as
/// `"Studio {studio_id}"`, where each `{name}` is replaced by the value of
/// that field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericRecord {
    label: String,
    fields: Map<String, Value>,
}

impl GenericRecord {
    /// Build a record, rendering its label from `template`.
    pub fn new(template: &str, fields: Map<String, Value>) -> Self {
        let label = render_label(template, &fields);
        Self { label, fields }
    }

    /// Build a record from `(name, value)` pairs.
    pub fn from_pairs<I, K>(template: &str, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let fields = pairs.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self::new(template, fields)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_u64(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(Value::as_u64)
    }

    /// Deserialize the record's fields into a typed struct.
    pub fn parse<T: serde::de::DeserializeOwned>(&self) -> crate::Result<T> {
        Ok(serde_json::from_value(Value::Object(self.fields.clone()))?)
    }
}

impl fmt::Display for GenericRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.label)
    }
}

fn render_label(template: &str, fields: &Map<String, Value>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                match fields.get(name) {
                    Some(Value::String(s)) => out.push_str(s),
                    Some(Value::Null) | None => out.push_str("?"),
                    Some(other) => out.push_str(&other.to_string()),
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_label_rendering() {
        let record = GenericRecord::from_pairs(
            "Studio {studio_id}",
            [("studio_id", json!(42)), ("title", json!("Cats"))],
        );
        assert_eq!(record.label(), "Studio 42");
        assert_eq!(record.to_string(), "<Studio 42>");
        assert_eq!(record.get_str("title"), Some("Cats"));
        assert_eq!(record.get_u64("studio_id"), Some(42));
    }

    #[test]
    fn test_label_missing_field() {
        let record = GenericRecord::from_pairs("News {newsid}", Vec::<(String, Value)>::new());
        assert_eq!(record.label(), "News ?");
    }

    #[test]
    fn test_label_unclosed_brace() {
        let record = GenericRecord::from_pairs("odd {label", [("label", json!("x"))]);
        assert_eq!(record.label(), "odd {label");
    }

    #[test]
    fn test_structural_equality() {
        let a = GenericRecord::from_pairs("News {id}", [("id", json!(1))]);
        let b = GenericRecord::from_pairs("News {id}", [("id", json!(1))]);
        let c = GenericRecord::from_pairs("News {id}", [("id", json!(2))]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_parse_typed() {
        #[derive(Deserialize)]
        struct News {
            id: u64,
            headline: String,
        }
        let record = GenericRecord::from_pairs(
            "News {id}",
            [("id", json!(7)), ("headline", json!("Hello"))],
        );
        let news: News = record.parse().unwrap();
        assert_eq!(news.id, 7);
        assert_eq!(news.headline, "Hello");
    }
}
