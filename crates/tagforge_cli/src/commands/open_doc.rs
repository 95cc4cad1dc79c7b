use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tagforge_service::cache::DocumentSource;

use crate::config::Config;
use crate::session::Session;

#[derive(Debug, Args)]
pub struct OpenDocArgs {
    pub url: String,

    /// Where to put the document body
    #[arg(short, long)]
    pub output: PathBuf,

    #[arg(long)]
    pub tenant: Option<String>,

    /// Skip the network and read from the cache
    #[arg(long)]
    pub offline: bool,
}

pub async fn execute(config: Config, args: OpenDocArgs) -> Result<()> {
    let session = Session::open(config, args.tenant.as_deref(), None).await?;
    let cache = session.cache()?;
    if args.offline {
        cache.set_online(false).await;
    }

    let opened = cache.open_document(&args.url, Some(session.tenant.as_str())).await;
    match &opened.source {
        DocumentSource::Network => println!("🌐 Loaded from the network"),
        DocumentSource::Cache { namespace } => println!("📦 Served from cache {}", namespace),
        DocumentSource::Placeholder => println!("📴 Not available offline, showing the offline page"),
    }

    let mut body = Vec::new();
    opened.response.replay_to(&mut body)?;
    tokio::fs::write(&args.output, &body)
        .await
        .with_context(|| format!("Failed to write {:?}", args.output))?;

    println!("💾 {} bytes written to {:?}", body.len(), args.output);
    Ok(())
}
