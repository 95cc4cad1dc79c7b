use crate::context::SchemaContext;
use crate::models::FormData;
use serde::Serialize;
use std::fmt;

pub mod rules;
pub mod rules_payload;

// The structure of a failure
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ValidationError {
    pub code: String,          // e.g., "FORM-002"
    pub message: String,       // "Spannung must be at most 1000."
    pub field: Option<String>, // Which field failed? None for whole-form checks
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

// The contract every rule must fulfill
pub trait ValidationRule: Send + Sync {
    fn check(&self, ctx: &SchemaContext, data: &FormData) -> Vec<ValidationError>;
    fn rule_id(&self) -> &str;
}

// The Engine that holds the registry of all rules.
// Rules run in registration order and every error is kept, so the report
// order is stable: all of rule 1's errors, then rule 2's, ...
#[derive(Default)]
pub struct ValidationEngine {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl ValidationEngine {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn add_rule<R: ValidationRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn run(&self, ctx: &SchemaContext, data: &FormData) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for rule in &self.rules {
            let mut rule_errors = rule.check(ctx, data);
            errors.append(&mut rule_errors);
        }
        errors
    }

    /// Plain messages, same order as `run`. Empty means valid.
    pub fn messages(&self, ctx: &SchemaContext, data: &FormData) -> Vec<String> {
        self.run(ctx, data).into_iter().map(|e| e.message).collect()
    }

    pub fn rule_ids(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.rule_id()).collect()
    }
}
