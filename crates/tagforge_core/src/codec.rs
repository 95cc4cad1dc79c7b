//! Tag URL payload codec.
//!
//! Wire format: `<base>#<key1>=<value1>&<key2>=<value2>...`
//!
//! Keys are short keys (or field names when a field has none), values are
//! `application/x-www-form-urlencoded`. The payload always travels in the
//! fragment: some tag readers mangle or drop query strings.

use serde::Serialize;
use url::form_urlencoded;

use crate::context::SchemaContext;
use crate::models::FormData;

/// One `key=value` pair of an encoded payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayloadRecord {
    pub key: String,
    pub value: String,
}

impl SchemaContext {
    /// The non-empty values of `data`, keyed for the wire, in schema order.
    pub fn payload_records(&self, data: &FormData) -> Vec<PayloadRecord> {
        self.fields()
            .iter()
            .filter_map(|field| {
                data.text(&field.name).map(|value| PayloadRecord {
                    key: field.param_key().to_string(),
                    value,
                })
            })
            .collect()
    }

    /// Encodes `data` into a tag URL. Fields not declared in the schema are
    /// not written. With nothing to write the result is `base_url#`.
    pub fn encode(&self, data: &FormData, base_url: &str) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for record in self.payload_records(data) {
            serializer.append_pair(&record.key, &record.value);
        }
        format!("{}#{}", strip_fragment(base_url), serializer.finish())
    }

    /// Maps already-split parameters back to field names. Unknown keys are
    /// dropped; a repeated key keeps its last value.
    pub fn decode<I, K, V>(&self, params: I) -> FormData
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut data = FormData::new();
        for (key, value) in params {
            if let Some(field) = self.resolve_param(key.as_ref()) {
                data.insert(field.name.clone(), value.into());
            }
        }
        data
    }

    /// Decodes a raw fragment (`HK=HC123&P=100`, leading `#` optional).
    pub fn decode_fragment(&self, fragment: &str) -> FormData {
        self.decode(parse_params(fragment))
    }

    /// Decodes the fragment of a full tag URL. A URL without a fragment
    /// carries no data.
    pub fn decode_url(&self, url: &str) -> FormData {
        match url.split_once('#') {
            Some((_, fragment)) => self.decode_fragment(fragment),
            None => FormData::new(),
        }
    }
}

/// Splits a form-urlencoded fragment into decoded pairs (`+` -> space).
pub fn parse_params(fragment: &str) -> Vec<(String, String)> {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    form_urlencoded::parse(fragment.as_bytes()).into_owned().collect()
}

/// Size of an encoded URL as written to a tag (UTF-8 bytes).
pub fn payload_size(url: &str) -> usize {
    url.len()
}

fn strip_fragment(base_url: &str) -> &str {
    match base_url.split_once('#') {
        Some((base, _)) => base,
        None => base_url,
    }
}
