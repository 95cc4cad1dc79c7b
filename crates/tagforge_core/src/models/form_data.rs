use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// FormData: field name -> value
// Same shape as the JSON export file: one flat object, keyed by field name.
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData(BTreeMap<String, Value>);

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// The wire form of a field's value, or `None` when it counts as empty.
    pub fn text(&self, name: &str) -> Option<String> {
        self.0.get(name).and_then(stringify_value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Drops empty values and turns the rest into strings, which is what a
    /// decoded tag URL gives back.
    pub fn stringified(&self) -> FormData {
        FormData(
            self.0
                .iter()
                .filter_map(|(k, v)| stringify_value(v).map(|s| (k.clone(), Value::String(s))))
                .collect(),
        )
    }

    pub fn from_json(json: &str) -> crate::Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        match value {
            Value::Object(map) => Ok(FormData(map.into_iter().collect())),
            other => Err(crate::Error::InvalidFormData(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn to_pretty_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(&self.0)?)
    }
}

impl FromIterator<(String, String)> for FormData {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        FormData(iter.into_iter().map(|(k, v)| (k, Value::String(v))).collect())
    }
}

/// `null` and blank strings are empty. Numbers are never empty, zero included.
pub(crate) fn stringify_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_zero_is_not_empty() {
        let data = FormData::new()
            .with("Spannung", 0)
            .with("Leistung", "0.0")
            .with("Strom", json!(0.0))
            .with("HK-Nr", "   ")
            .with("Projekt-Nr.", Value::Null);

        assert_eq!(data.text("Spannung").as_deref(), Some("0"));
        assert_eq!(data.text("Leistung").as_deref(), Some("0.0"));
        assert_eq!(data.text("Strom").as_deref(), Some("0.0"));
        assert_eq!(data.text("HK-Nr"), None);
        assert_eq!(data.text("Projekt-Nr."), None);
        assert_eq!(data.text("missing"), None);
    }

    #[test]
    fn test_stringified_drops_empty_values() {
        let data = FormData::new()
            .with("HK-Nr", "HC123")
            .with("Spannung", 230)
            .with("Leistung", "");

        let expected = FormData::new().with("HK-Nr", "HC123").with("Spannung", "230");
        assert_eq!(data.stringified(), expected);
    }

    #[test]
    fn test_json_export_shape() {
        let data = FormData::new().with("HK-Nr", "HC123").with("Spannung", "230");
        let json = data.to_pretty_json().unwrap();

        assert!(json.contains("\n  \"HK-Nr\": \"HC123\""));
        assert_eq!(FormData::from_json(&json).unwrap(), data);
    }

    #[test]
    fn test_import_rejects_non_objects() {
        assert!(FormData::from_json("[1, 2]").is_err());
        assert!(FormData::from_json("{ not json").is_err());
    }
}
