use std::collections::HashMap;

use crate::models::{FieldDefinition, FieldType, FormData, Schema};
use crate::registry::FieldRegistry;
use crate::validation::rules::is_web_url;

/// Everything derived from one loaded schema.
///
/// Built fresh on every schema load and passed to whatever needs it; there is
/// no process-wide schema.
#[derive(Debug, Clone)]
pub struct SchemaContext {
    schema: Schema,
    registry: FieldRegistry,
    by_short_key: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

impl SchemaContext {
    pub fn load(schema: Schema) -> Self {
        let registry = FieldRegistry::build(&schema);

        let mut by_short_key = HashMap::new();
        let mut by_name = HashMap::new();
        for (index, field) in schema.fields.iter().enumerate() {
            // First declaration wins for shared short keys
            if let Some(key) = field.short_key.as_deref().filter(|k| !k.is_empty()) {
                by_short_key.entry(key.to_string()).or_insert(index);
            }
            by_name.entry(field.name.clone()).or_insert(index);
        }

        Self { schema, registry, by_short_key, by_name }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.schema.fields
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.by_name.get(name).map(|&i| &self.schema.fields[i])
    }

    pub fn identifier_for(&self, name: &str) -> Option<&str> {
        self.registry.identifier_for(name)
    }

    pub fn name_for(&self, identifier: &str) -> Option<&str> {
        self.registry.name_for(identifier)
    }

    /// Maps a URL parameter back to its field: short key first, then the
    /// plain field name for URLs written without short keys.
    pub fn resolve_param(&self, key: &str) -> Option<&FieldDefinition> {
        self.by_short_key
            .get(key)
            .or_else(|| self.by_name.get(key))
            .map(|&i| &self.schema.fields[i])
    }

    /// Document links carried by the data: well-formed http(s) values of url
    /// fields, in schema order.
    pub fn document_links(&self, data: &FormData) -> Vec<String> {
        self.schema
            .fields
            .iter()
            .filter(|f| f.kind == FieldType::Url)
            .filter_map(|f| data.text(&f.name))
            .filter(|value| is_web_url(value.trim()))
            .map(|value| value.trim().to_string())
            .collect()
    }
}
