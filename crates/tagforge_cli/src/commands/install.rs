use anyhow::Result;
use clap::Args;

use crate::config::Config;
use crate::session::Session;

#[derive(Debug, Args)]
pub struct InstallArgs {
    /// Assets to precache instead of the built-in core list
    #[arg(long = "asset")]
    pub assets: Vec<String>,
}

pub async fn execute(config: Config, args: InstallArgs) -> Result<()> {
    let session = Session::open(config, None, None).await?;
    let cache = session.cache()?;

    let assets = if args.assets.is_empty() { cache.config().core_assets.clone() } else { args.assets };
    println!("📦 Precaching {} core asset(s) into {}...", assets.len(), cache.config().core_namespace());

    let report = cache.install(&assets).await;
    println!("✅ Cached: {}", report.cached);
    for asset in &report.skipped {
        println!("⚠️  Skipped: {}", asset);
    }
    Ok(())
}
