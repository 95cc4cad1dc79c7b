use anyhow::Result;
use clap::Args;
use tagforge_service::CacheOutcome;

use super::print_log;
use crate::config::Config;
use crate::session::Session;

#[derive(Debug, Args)]
pub struct CacheDocArgs {
    /// Document URL (absolute, or relative to the app origin)
    pub url: String,

    #[arg(long)]
    pub tenant: Option<String>,

    /// Treat the device as offline: queue instead of downloading
    #[arg(long)]
    pub offline: bool,
}

pub async fn execute(config: Config, args: CacheDocArgs) -> Result<()> {
    let session = Session::open(config, args.tenant.as_deref(), None).await?;
    let cache = session.cache()?;
    if args.offline {
        cache.set_online(false).await;
    }

    println!("📥 Caching {} for tenant {}...", args.url, session.tenant);
    let outcome = cache.cache_document(&args.url, Some(session.tenant.as_str())).await;
    print_log(cache.log());
    match outcome {
        CacheOutcome::Cached { namespace } => println!("✅ Available offline (cache {})", namespace),
        CacheOutcome::Queued => println!("🕒 Download queued until the connection returns"),
        CacheOutcome::Failed { reason } => println!("🛑 Caching failed: {}", reason),
    }
    Ok(())
}
