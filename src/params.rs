//! Read-only accessors over a step's parameter bag.
//!
//! The bag is whatever the XML decoder produced for a step's storage object,
//! so every accessor tolerates missing keys, `null`s, wrong shapes, and the
//! list-or-singleton ambiguity of decoded repeated elements.

use serde_json::Value;

/// Values that stand for "no table" or "no name" in exported definitions.
const PLACEHOLDERS: &[&str] = &["n/a", "none", "(none)", "<none>", "-", "null"];

/// Keys some XML decoders use for the text content of an element.
const TEXT_KEYS: &[&str] = &["#text", "$text", "$value"];

/// Renders a scalar JSON value as text. Arrays, nulls and plain objects have no
/// scalar form and yield `None`.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(map) => TEXT_KEYS
            .iter()
            .find_map(|key| map.get(*key))
            .and_then(scalar_text),
        Value::Null | Value::Array(_) => None,
    }
}

/// True for empty strings and the placeholder names exporters write for "nothing".
pub fn is_placeholder(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty()
        || PLACEHOLDERS
            .iter()
            .any(|p| trimmed.eq_ignore_ascii_case(p))
}

/// Normalizes a list-or-singleton value into a list of item references.
///
/// `null` is the empty list, an array is itself, a wrapper object holding a
/// single array (`{"Column": [...]}`) is that array, and anything else is a
/// one-element list.
pub fn as_list(value: &Value) -> Vec<&Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) if map.len() == 1 => match map.values().next() {
            Some(Value::Array(items)) => items.iter().collect(),
            _ => vec![value],
        },
        other => vec![other],
    }
}

/// A borrowed view of one parameter bag.
#[derive(Debug, Clone, Copy)]
pub struct Params<'a> {
    value: &'a Value,
}

impl<'a> Params<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self { value }
    }

    pub fn value(&self) -> &'a Value {
        self.value
    }

    pub fn is_empty(&self) -> bool {
        match self.value {
            Value::Object(map) => map.is_empty(),
            Value::Null => true,
            _ => false,
        }
    }

    /// Looks up a key, preferring an exact match and falling back to a
    /// case-insensitive one.
    pub fn raw(&self, key: &str) -> Option<&'a Value> {
        let map = self.value.as_object()?;
        map.get(key)
            .or_else(|| {
                map.iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(key))
                    .map(|(_, v)| v)
            })
            .filter(|v| !v.is_null())
    }

    pub fn first_raw(&self, keys: &[&str]) -> Option<&'a Value> {
        keys.iter().find_map(|key| self.raw(key))
    }

    /// Non-empty scalar text stored under `key`.
    pub fn text(&self, key: &str) -> Option<String> {
        self.raw(key)
            .and_then(scalar_text)
            .filter(|s| !s.is_empty())
    }

    pub fn first_text(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.text(key))
    }

    /// Like [`Params::text`], but also rejects placeholder names such as `N/A`.
    pub fn name(&self, key: &str) -> Option<String> {
        self.text(key).filter(|s| !is_placeholder(s))
    }

    pub fn first_name(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.name(key))
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        let text = self.text(key)?;
        Some(matches!(
            text.to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "y" | "on"
        ))
    }

    /// The list stored under `key`, normalized from list-or-singleton form.
    pub fn list(&self, key: &str) -> Vec<&'a Value> {
        self.raw(key).map(as_list).unwrap_or_default()
    }

    pub fn first_list(&self, keys: &[&str]) -> Vec<&'a Value> {
        keys.iter()
            .map(|key| self.list(key))
            .find(|items| !items.is_empty())
            .unwrap_or_default()
    }

    /// Scalar texts of every list item under `key`, skipping non-scalar items.
    pub fn text_list(&self, key: &str) -> Vec<String> {
        self.list(key)
            .into_iter()
            .filter_map(scalar_text)
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn child(&self, key: &str) -> Option<Params<'a>> {
        self.raw(key).map(Params::new)
    }

    /// Every scalar leaf of the bag joined by single spaces, in document order.
    /// Keys are not included, only values.
    pub fn flat_text(&self) -> String {
        let mut parts = Vec::new();
        collect_leaves(self.value, &mut parts);
        parts.join(" ")
    }
}

fn collect_leaves(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Array(items) => items.iter().for_each(|item| collect_leaves(item, out)),
        Value::Object(map) => map.values().for_each(|v| collect_leaves(v, out)),
        Value::Null => {}
        scalar => {
            if let Some(text) = scalar_text(scalar).filter(|s| !s.is_empty()) {
                out.push(text);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_normalizes_singletons_and_wrappers() {
        let bag = json!({
            "Columns": { "Name": "A" },
            "Wrapped": { "Column": [{ "Name": "B" }, { "Name": "C" }] },
            "Many": [1, 2, 3],
        });
        let params = Params::new(&bag);
        assert_eq!(params.list("Columns").len(), 1);
        assert_eq!(params.list("Wrapped").len(), 2);
        assert_eq!(params.list("Many").len(), 3);
        assert!(params.list("Missing").is_empty());
    }

    #[test]
    fn test_name_skips_placeholders() {
        let bag = json!({ "SourceTable": "N/A", "TargetTable": " Orders ", "tablename": "x" });
        let params = Params::new(&bag);
        assert_eq!(params.name("SourceTable"), None);
        assert_eq!(params.name("TargetTable").as_deref(), Some("Orders"));
        assert_eq!(params.name("TableName").as_deref(), Some("x"));
    }

    #[test]
    fn test_flat_text_contains_values_not_keys() {
        let bag = json!({ "Sql": "SELECT @Total", "Nested": { "Value": 5, "Flag": true } });
        let flat = Params::new(&bag).flat_text();
        assert_eq!(flat, "SELECT @Total 5 true");
    }

    #[test]
    fn test_xml_text_nodes_are_scalars() {
        let bag = json!({ "Subject": { "#text": "Nightly load" } });
        assert_eq!(
            Params::new(&bag).text("Subject").as_deref(),
            Some("Nightly load")
        );
    }
}
