use crate::codec::payload_size;
use crate::context::SchemaContext;
use crate::models::FormData;
use crate::validation::{ValidationError, ValidationRule};

/// NTAG215 user memory minus NDEF framing, rounded down.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 880;

// =========================================================================
// RULE: FORM-004
// "The encoded tag URL must fit on the tag"
//
// Runs the real encoder over the whole form, so it sees exactly the bytes
// the writer would send.
// =========================================================================
pub struct PayloadSizeRule {
    pub base_url: String,
    pub max_bytes: usize,
}

impl PayloadSizeRule {
    pub fn new(base_url: impl Into<String>, max_bytes: usize) -> Self {
        Self { base_url: base_url.into(), max_bytes }
    }
}

impl ValidationRule for PayloadSizeRule {
    fn rule_id(&self) -> &str { "FORM-004" }

    fn check(&self, ctx: &SchemaContext, data: &FormData) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let size = payload_size(&ctx.encode(data, &self.base_url));

        if size > self.max_bytes {
            errors.push(ValidationError {
                code: self.rule_id().to_string(),
                message: format!(
                    "Payload too large: {} / {} bytes. Shorten some values.",
                    size, self.max_bytes
                ),
                field: None,
            });
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldDefinition, FieldType, Schema};

    #[test]
    fn test_payload_limit() {
        let ctx = SchemaContext::load(Schema::new(vec![
            FieldDefinition::new("Notiz", FieldType::Text).with_short_key("N"),
        ]));
        let base = "https://example.com";
        // "https://example.com#N=" is 22 bytes
        let rule = PayloadSizeRule::new(base, 30);

        assert!(rule.check(&ctx, &FormData::new().with("Notiz", "12345678")).is_empty());

        let errors = rule.check(&ctx, &FormData::new().with("Notiz", "123456789"));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.starts_with("Payload too large: 31 / 30"));
        assert_eq!(errors[0].field, None);
    }

    #[test]
    fn test_multibyte_values_count_encoded_bytes() {
        let ctx = SchemaContext::load(Schema::new(vec![
            FieldDefinition::new("Notiz", FieldType::Text).with_short_key("N"),
        ]));
        // "ä" is written as "%C3%A4": six bytes on the tag
        let rule = PayloadSizeRule::new("https://example.com", 28);
        assert!(rule.check(&ctx, &FormData::new().with("Notiz", "ä")).is_empty());
        assert_eq!(rule.check(&ctx, &FormData::new().with("Notiz", "äa")).len(), 1);
    }
}
