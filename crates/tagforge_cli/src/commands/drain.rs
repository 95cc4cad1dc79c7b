use anyhow::Result;
use clap::Args;
use tagforge_db::PendingRepository;

use super::print_log;
use crate::config::Config;
use crate::session::Session;

#[derive(Debug, Args)]
pub struct DrainArgs {
    /// Only show the queue
    #[arg(long)]
    pub list: bool,
}

pub async fn execute(config: Config, args: DrainArgs) -> Result<()> {
    let session = Session::open(config, None, None).await?;

    let queued = PendingRepository::new(session.pool.clone()).list().await?;
    println!("🕒 {} queued download(s)", queued.len());
    for item in &queued {
        println!(
            "   {} (tenant {}, queued {})",
            item.url,
            item.tenant.as_deref().unwrap_or("-"),
            item.queued_at.format("%Y-%m-%d %H:%M:%S")
        );
    }

    if args.list || queued.is_empty() {
        return Ok(());
    }

    let report = session.cache()?.drain_pending().await;
    print_log(&session.log);
    println!("✅ Cached: {}", report.cached.len());
    if !report.remaining.is_empty() {
        println!("⚠️  Still queued: {}", report.remaining.len());
    }
    Ok(())
}
