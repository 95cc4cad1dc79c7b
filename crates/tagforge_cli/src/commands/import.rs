use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tagforge_core::codec::payload_size;
use tagforge_core::{standard_validator, FormData};

use crate::config::Config;
use crate::session::Session;

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// JSON export to load
    pub file: PathBuf,

    #[arg(long)]
    pub tenant: Option<String>,
}

pub async fn execute(config: Config, args: ImportArgs) -> Result<()> {
    let session = Session::open(config, args.tenant.as_deref(), None).await?;

    let raw = std::fs::read_to_string(&args.file).with_context(|| format!("Failed to read {:?}", args.file))?;
    let data = FormData::from_json(&raw).with_context(|| format!("{:?} is not a form export", args.file))?;

    let unknown: Vec<&String> = data.iter().map(|(name, _)| name).filter(|name| session.ctx.field(name).is_none()).collect();
    println!("📥 Imported {} field(s) from {:?}", data.len() - unknown.len(), args.file);
    for name in unknown {
        println!("   ignored unknown field '{}'", name);
    }

    let messages = standard_validator(&session.config.base_url, session.config.max_payload).messages(&session.ctx, &data);
    for message in &messages {
        println!("⚠️  {}", message);
    }

    let url = session.ctx.encode(&data, &session.config.base_url);
    println!("🔗 {}", url);
    println!("📏 Payload: {} / {} bytes", payload_size(&url), session.config.max_payload);
    Ok(())
}
