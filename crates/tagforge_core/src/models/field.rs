use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Field kinds
// The form renderer and the validator both switch on this.
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Number,
    Date,
    Url,
    Radio,
    Checkbox,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Url => "url",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
        }
    }
}

// ---------------------------------------------------------------------------
// A single schema field
// `name` is the stable key everywhere outside the URL.
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: String,

    // URL parameter name; several fields may share one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_key: Option<String>,

    #[serde(rename = "type", default)]
    pub kind: FieldType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    // Allowed values for radio fields (display only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, kind: FieldType) -> Self {
        Self {
            name: name.into(),
            short_key: None,
            kind,
            unit: None,
            min: None,
            max: None,
            required: false,
            group: None,
            options: Vec::new(),
        }
    }

    pub fn with_short_key(mut self, short_key: impl Into<String>) -> Self {
        self.short_key = Some(short_key.into());
        self
    }

    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// The key this field is written under in a tag URL.
    pub fn param_key(&self) -> &str {
        match self.short_key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => &self.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldGroup {
    pub id: String,
    #[serde(default)]
    pub label_key: String,
    #[serde(default)]
    pub order: u32,
}

// ---------------------------------------------------------------------------
// The Schema
// Field order is declaration order; every deterministic walk uses it.
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Schema {
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<FieldGroup>,
}

impl Schema {
    pub fn new(fields: Vec<FieldDefinition>) -> Self {
        Self { fields, groups: Vec::new() }
    }

    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Built-in inspection schema used when no tenant schema can be loaded.
    pub fn default_inspection() -> Self {
        Self::new(vec![
            FieldDefinition::new("HK-Nr", FieldType::Text)
                .with_short_key("HK")
                .required(),
            FieldDefinition::new("Leistung", FieldType::Number)
                .with_short_key("P")
                .with_unit("kW")
                .with_range(Some(0.0), None),
            FieldDefinition::new("Spannung", FieldType::Number)
                .with_short_key("U")
                .with_unit("V")
                .with_range(Some(0.0), Some(1000.0)),
            FieldDefinition::new("Strom", FieldType::Number)
                .with_short_key("I")
                .with_unit("A")
                .with_range(Some(0.0), None),
            FieldDefinition::new("Projekt-Nr.", FieldType::Text).with_short_key("Proj"),
            FieldDefinition::new("geprüft von", FieldType::Text).with_short_key("Chk"),
            FieldDefinition::new("am", FieldType::Date).with_short_key("Date"),
            FieldDefinition::new("Dokumentation", FieldType::Url).with_short_key("Doc"),
        ])
    }
}
