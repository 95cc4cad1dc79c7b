pub mod activate;
pub mod cache_doc;
pub mod decode;
pub mod drain;
pub mod encode;
pub mod export;
pub mod import;
pub mod install;
pub mod open_doc;
pub mod rebuild;
pub mod validate;
pub mod write;

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tagforge_core::{FormData, SchemaContext};
use tagforge_service::event_log::{EventLog, LogLevel};

/// Prints the session log oldest first, like a transcript.
pub fn print_log(log: &EventLog) {
    for entry in log.entries().into_iter().rev() {
        let icon = match entry.level {
            LogLevel::Info => "ℹ️ ",
            LogLevel::Ok => "✅",
            LogLevel::Err => "🛑",
        };
        println!("{} [{}] {}", icon, entry.timestamp.format("%H:%M:%S"), entry.message);
    }
}

/// Form values from a JSON file, individual `-f KEY=VALUE` flags, or both
/// (flags win).
#[derive(Debug, Args)]
pub struct FormInput {
    /// JSON file with `{ "field": value }` pairs, as written by `export`
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Field value as KEY=VALUE. KEY is a field name, short key or form identifier
    #[arg(short = 'f', long = "field", value_parser = parse_key_val)]
    pub fields: Vec<(String, String)>,
}

impl FormInput {
    pub fn load(&self, ctx: &SchemaContext) -> Result<FormData> {
        let mut data = match &self.data {
            Some(path) => {
                let raw = std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
                FormData::from_json(&raw).with_context(|| format!("{:?} is not a form export", path))?
            }
            None => FormData::new(),
        };

        for (key, value) in &self.fields {
            let name = resolve_field_name(ctx, key).with_context(|| format!("Unknown field '{}'", key))?;
            data.insert(name, value.clone());
        }
        Ok(data)
    }
}

fn resolve_field_name(ctx: &SchemaContext, key: &str) -> Option<String> {
    ctx.resolve_param(key)
        .map(|field| field.name.clone())
        .or_else(|| ctx.name_for(key).map(str::to_string))
}

fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    if key.trim().is_empty() {
        return Err(format!("empty key in '{}'", raw));
    }
    Ok((key.trim().to_string(), value.to_string()))
}
