use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::config::Config;
use crate::session::Session;

#[derive(Debug, Args)]
pub struct DecodeArgs {
    /// The URL read from the tag
    pub url: String,

    /// Tenant whose schema is used (defaults to the tenant in the URL path)
    #[arg(long)]
    pub tenant: Option<String>,

    /// Also save the decoded fields as a JSON export
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub async fn execute(config: Config, args: DecodeArgs) -> Result<()> {
    let path = url::Url::parse(&args.url).ok().map(|u| u.path().to_string());
    let session = Session::open(config, args.tenant.as_deref(), path.as_deref()).await?;

    let data = session.ctx.decode_url(&args.url);
    if data.is_empty() {
        println!("ℹ️  The URL carries no known fields.");
        return Ok(());
    }

    println!("📋 Tag data ({}):", session.tenant);
    for field in session.ctx.fields() {
        if let Some(value) = data.text(&field.name) {
            match &field.unit {
                Some(unit) => println!("   {}: {} {}", field.name, value, unit),
                None => println!("   {}: {}", field.name, value),
            }
        }
    }

    for link in session.ctx.document_links(&data) {
        println!("📄 Document: {}", link);
    }

    if let Some(output) = args.output {
        let json = data.to_pretty_json()?;
        std::fs::write(&output, json).with_context(|| format!("Failed to write {:?}", output))?;
        println!("💾 Saved to {:?}", output);
    }
    Ok(())
}
