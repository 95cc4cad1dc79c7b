use anyhow::{Context, Result};
use clap::Args;
use sqlx::SqlitePool;
use tagforge_db::schema::{rebuild_database, reset_database};

#[derive(Debug, Args)]
pub struct RebuildArgs {
    /// DANGER: Drop cached documents, the download queue and settings first
    #[arg(long)]
    pub reset: bool,
}

pub async fn execute(pool: SqlitePool, args: RebuildArgs) -> Result<()> {
    println!("🏗️  Rebuilding local store schema...");

    if args.reset {
        println!("🔥 Reset requested. Dropping all tables...");
        reset_database(&pool).await.context("Failed to reset the store")?;
    }

    rebuild_database(&pool).await.context("Failed to apply the schema")?;

    println!("✅ Schema applied successfully.");
    Ok(())
}
