//! Bibliographic record model
//!
//! A record is one JSON object as returned by a source API. The core only
//! inspects a handful of fields (identity, title, abstract); everything
//! else is an opaque payload carried through to the output unchanged.

use serde_json::{Map, Value};

/// One bibliographic item. Wraps the raw JSON object; field access is by
/// name so each source can map its own identity/title/abstract fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Parse one JSONL line. Anything that is not a JSON object counts as
    /// a parse failure (the caller drops it silently and keeps a count).
    pub fn parse(line: &str) -> Option<Self> {
        match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(map)) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn raw(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// String value of a field, or `None` for missing/non-string values.
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// Field as free text: strings pass through, sequences of strings are
    /// joined with single spaces (non-string elements skipped), anything
    /// else is empty text.
    pub fn text_field(&self, field: &str) -> String {
        match self.0.get(field) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Array(items)) => {
                let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
                parts.join(" ")
            }
            _ => String::new(),
        }
    }

    /// Pre-write enrichment (e.g. the `source_query` annotation). Records
    /// are immutable once written; this is only called before the write.
    pub fn set(&mut self, field: &str, value: Value) {
        self.0.insert(field.to_string(), value);
    }

    /// Serialize as one JSONL line (no trailing newline).
    pub fn to_line(&self) -> String {
        serde_json::to_string(&self.0).expect("JSON map serialization cannot fail")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_object() {
        let rec = Record::parse(r#"{"DOI":"10.1/x","title":"Anode"}"#).unwrap();
        assert_eq!(rec.str_field("DOI"), Some("10.1/x"));
    }

    #[test]
    fn parse_rejects_non_object() {
        assert!(Record::parse("[1,2,3]").is_none());
        assert!(Record::parse("\"text\"").is_none());
        assert!(Record::parse("not json at all").is_none());
    }

    #[test]
    fn text_field_string() {
        let rec = Record::parse(r#"{"title":"Lithium anode"}"#).unwrap();
        assert_eq!(rec.text_field("title"), "Lithium anode");
    }

    #[test]
    fn text_field_joins_string_list() {
        let rec = Record::parse(r#"{"title":["Lithium","metal","anode"]}"#).unwrap();
        assert_eq!(rec.text_field("title"), "Lithium metal anode");
    }

    #[test]
    fn text_field_skips_non_string_list_items() {
        let rec = Record::parse(r#"{"title":["Lithium",42,"anode"]}"#).unwrap();
        assert_eq!(rec.text_field("title"), "Lithium anode");
    }

    #[test]
    fn text_field_non_text_is_empty() {
        let rec = Record::parse(r#"{"title":{"nested":true},"year":2019}"#).unwrap();
        assert_eq!(rec.text_field("title"), "");
        assert_eq!(rec.text_field("year"), "");
        assert_eq!(rec.text_field("missing"), "");
    }

    #[test]
    fn set_then_serialize() {
        let mut rec = Record::parse(r#"{"DOI":"10.1/x"}"#).unwrap();
        rec.set("source_query", json!("solid electrolyte"));
        let line = rec.to_line();
        let back = Record::parse(&line).unwrap();
        assert_eq!(back.str_field("source_query"), Some("solid electrolyte"));
        assert_eq!(back.str_field("DOI"), Some("10.1/x"));
    }

    #[test]
    fn payload_preserved_verbatim() {
        let line = r#"{"DOI":"10.1/x","license":[{"URL":"https://x"}],"score":1.5}"#;
        let rec = Record::parse(line).unwrap();
        assert_eq!(rec.to_line(), line);
    }
}
