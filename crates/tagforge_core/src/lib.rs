pub mod codec;
pub mod context;
pub mod error;
pub mod models;
pub mod registry;
pub mod validation;

pub use context::SchemaContext;
pub use error::{Error, Result};
pub use models::{FieldDefinition, FieldType, FormData, Schema};

use validation::{rules, rules_payload, ValidationEngine};

/// The form checks run before every tag write, in report order:
/// required, numeric, url, payload size.
pub fn standard_validator(base_url: &str, max_payload_bytes: usize) -> ValidationEngine {
    ValidationEngine::new()
        .add_rule(rules::RequiredFieldRule)
        .add_rule(rules::NumericRangeRule)
        .add_rule(rules::UrlFormatRule)
        .add_rule(rules_payload::PayloadSizeRule::new(base_url, max_payload_bytes))
}
