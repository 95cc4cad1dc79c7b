use std::collections::HashMap;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::models::{FieldDefinition, Schema};

const FALLBACK_SLUG: &str = "field";

/// Turns a short key or field name into a URL/DOM-safe slug.
///
/// Diacritics are stripped (`ä` -> `a`), every run of characters outside
/// `[A-Za-z0-9_]` becomes a single `-`, separators at either end are dropped
/// and the result is lowercased. An empty result becomes `"field"`.
pub fn slugify(source: &str) -> String {
    let mut slug = String::with_capacity(source.len());
    let mut pending_separator = false;

    for ch in source.nfd().filter(|c| !is_combining_mark(*c)) {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// The slug a field starts from before collision handling.
pub fn base_slug(field: &FieldDefinition) -> String {
    match field.short_key.as_deref() {
        Some(key) if !key.is_empty() => slugify(key),
        _ if !field.name.is_empty() => slugify(&field.name),
        _ => FALLBACK_SLUG.to_string(),
    }
}

// ---------------------------------------------------------------------------
// FieldRegistry
// name <-> identifier, built once per schema load.
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    // (name, identifier) in declaration order
    entries: Vec<(String, String)>,
    by_name: HashMap<String, usize>,
    by_identifier: HashMap<String, usize>,
}

impl FieldRegistry {
    /// Assigns identifiers in declaration order. The first field with a given
    /// base slug keeps it bare, later ones get `-1`, `-2`, ...
    pub fn build(schema: &Schema) -> Self {
        let mut registry = FieldRegistry::default();
        for field in &schema.fields {
            registry.register(field);
        }
        registry
    }

    fn register(&mut self, field: &FieldDefinition) {
        if self.by_name.contains_key(&field.name) {
            return;
        }

        let base = base_slug(field);
        let mut candidate = base.clone();
        let mut suffix = 1;
        while self.by_identifier.contains_key(&candidate) {
            candidate = format!("{}-{}", base, suffix);
            suffix += 1;
        }

        let index = self.entries.len();
        self.by_name.insert(field.name.clone(), index);
        self.by_identifier.insert(candidate.clone(), index);
        self.entries.push((field.name.clone(), candidate));
    }

    pub fn identifier_for(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(|&i| self.entries[i].1.as_str())
    }

    pub fn name_for(&self, identifier: &str) -> Option<&str> {
        self.by_identifier.get(identifier).map(|&i| self.entries[i].0.as_str())
    }

    /// `(name, identifier)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, id)| (n.as_str(), id.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldType;

    fn text(name: &str, short_key: Option<&str>) -> FieldDefinition {
        let field = FieldDefinition::new(name, FieldType::Text);
        match short_key {
            Some(key) => field.with_short_key(key),
            None => field,
        }
    }

    #[test]
    fn test_slugify_strips_diacritics() {
        assert_eq!(slugify("Wächter"), "wachter");
        assert_eq!(slugify("Wäch"), "wach");
        assert_eq!(slugify("Größe"), "gro-e");
        assert_eq!(slugify("Crème brûlée"), "creme-brulee");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("geprüft von"), "gepruft-von");
        assert_eq!(slugify("Projekt-Nr."), "projekt-nr");
        assert_eq!(slugify("  --a   b--  "), "a-b");
        assert_eq!(slugify("snake_case_Key"), "snake_case_key");
    }

    #[test]
    fn test_slugify_falls_back_to_field() {
        assert_eq!(slugify(""), "field");
        assert_eq!(slugify("°/%"), "field");
    }

    #[test]
    fn test_short_key_preferred_over_name() {
        let schema = Schema::new(vec![text("Sehr langes Feldname", Some("HK"))]);
        let registry = FieldRegistry::build(&schema);
        assert_eq!(registry.identifier_for("Sehr langes Feldname"), Some("hk"));
    }

    #[test]
    fn test_name_used_without_short_key() {
        let schema = Schema::new(vec![text("Wächter", None)]);
        let registry = FieldRegistry::build(&schema);
        assert_eq!(registry.identifier_for("Wächter"), Some("wachter"));
        assert_eq!(registry.name_for("wachter"), Some("Wächter"));
    }

    #[test]
    fn test_collisions_suffixed_in_declaration_order() {
        let schema = Schema::new(vec![
            text("HK-Nr", Some("HK")),
            text("Hauskanal", Some("HK")),
            text("Hauptkanal", Some("HK")),
        ]);
        let registry = FieldRegistry::build(&schema);

        assert_eq!(registry.identifier_for("HK-Nr"), Some("hk"));
        assert_eq!(registry.identifier_for("Hauskanal"), Some("hk-1"));
        assert_eq!(registry.identifier_for("Hauptkanal"), Some("hk-2"));

        assert_eq!(registry.name_for("hk"), Some("HK-Nr"));
        assert_eq!(registry.name_for("hk-1"), Some("Hauskanal"));
        assert_eq!(registry.name_for("hk-2"), Some("Hauptkanal"));
    }

    #[test]
    fn test_suffix_skips_identifiers_already_taken() {
        // "hk-1" is claimed outright by the second field, so the third "HK"
        // has to move on to "hk-2".
        let schema = Schema::new(vec![
            text("A", Some("HK")),
            text("B", Some("hk-1")),
            text("C", Some("HK")),
        ]);
        let registry = FieldRegistry::build(&schema);

        assert_eq!(registry.identifier_for("A"), Some("hk"));
        assert_eq!(registry.identifier_for("B"), Some("hk-1"));
        assert_eq!(registry.identifier_for("C"), Some("hk-2"));
    }

    #[test]
    fn test_unknown_lookups() {
        let registry = FieldRegistry::build(&Schema::new(vec![text("HK-Nr", Some("HK"))]));
        assert_eq!(registry.name_for("unknown-id"), None);
        assert_eq!(registry.identifier_for("Unbekannt"), None);
    }

    #[test]
    fn test_empty_schema() {
        let registry = FieldRegistry::build(&Schema::default());
        assert!(registry.is_empty());
        assert_eq!(registry.iter().count(), 0);
    }
}
