use anyhow::Result;
use clap::Args;

use crate::config::Config;
use crate::session::Session;

#[derive(Debug, Args)]
pub struct ActivateArgs {}

pub async fn execute(config: Config, _args: ActivateArgs) -> Result<()> {
    let session = Session::open(config, None, None).await?;
    let cache = session.cache()?;

    println!("🧹 Activating cache version {}...", cache.config().core_namespace());
    let deleted = cache.activate().await?;
    if deleted.is_empty() {
        println!("✅ Nothing to clean up.");
    }
    for namespace in deleted {
        println!("   deleted {}", namespace);
    }
    Ok(())
}
