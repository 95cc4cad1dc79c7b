use crate::context::SchemaContext;
use crate::models::{FieldType, FormData};
use crate::validation::{ValidationError, ValidationRule};
use url::Url;

/// Absolute URL with an `http` or `https` scheme and a host.
pub fn is_web_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.has_host(),
        Err(_) => false,
    }
}

// =========================================================================
// RULE: FORM-001
// "A required field must carry a non-blank value"
// =========================================================================
pub struct RequiredFieldRule;

impl ValidationRule for RequiredFieldRule {
    fn rule_id(&self) -> &str { "FORM-001" }

    fn check(&self, ctx: &SchemaContext, data: &FormData) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for field in ctx.fields().iter().filter(|f| f.required) {
            if data.text(&field.name).is_none() {
                errors.push(ValidationError {
                    code: self.rule_id().to_string(),
                    message: format!("{} is a required field.", field.name),
                    field: Some(field.name.clone()),
                });
            }
        }
        errors
    }
}

// =========================================================================
// RULE: FORM-002
// "Number fields must parse as numbers and stay within min/max"
// =========================================================================
pub struct NumericRangeRule;

impl ValidationRule for NumericRangeRule {
    fn rule_id(&self) -> &str { "FORM-002" }

    fn check(&self, ctx: &SchemaContext, data: &FormData) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for field in ctx.fields().iter().filter(|f| f.kind == FieldType::Number) {
            let Some(raw) = data.text(&field.name) else { continue };

            let value = match raw.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => v,
                _ => {
                    errors.push(ValidationError {
                        code: self.rule_id().to_string(),
                        message: format!("{} must be a number (got '{}').", field.name, raw),
                        field: Some(field.name.clone()),
                    });
                    continue;
                }
            };

            if let Some(min) = field.min {
                if value < min {
                    errors.push(ValidationError {
                        code: self.rule_id().to_string(),
                        message: format!("{} must be at least {}.", field.name, min),
                        field: Some(field.name.clone()),
                    });
                }
            }
            if let Some(max) = field.max {
                if value > max {
                    errors.push(ValidationError {
                        code: self.rule_id().to_string(),
                        message: format!("{} must be at most {}.", field.name, max),
                        field: Some(field.name.clone()),
                    });
                }
            }
        }
        errors
    }
}

// =========================================================================
// RULE: FORM-003
// "URL fields must hold an absolute http(s) URL"
// =========================================================================
pub struct UrlFormatRule;

impl ValidationRule for UrlFormatRule {
    fn rule_id(&self) -> &str { "FORM-003" }

    fn check(&self, ctx: &SchemaContext, data: &FormData) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for field in ctx.fields().iter().filter(|f| f.kind == FieldType::Url) {
            let Some(raw) = data.text(&field.name) else { continue };
            if !is_web_url(raw.trim()) {
                errors.push(ValidationError {
                    code: self.rule_id().to_string(),
                    message: format!("{} is not a valid http(s) URL.", field.name),
                    field: Some(field.name.clone()),
                });
            }
        }
        errors
    }
}
