// tagforge_cli/src/main.rs
use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tagforge_cli::commands;
use tagforge_cli::config::Config;

#[derive(Parser)]
#[command(name = "tagforge")]
#[command(about = "Write inspection data to NFC tags as compact URLs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode form values into the tag URL
    Encode(commands::encode::EncodeArgs),

    /// Decode a scanned tag URL back into form values
    Decode(commands::decode::DecodeArgs),

    /// Check form values before writing
    Validate(commands::validate::ValidateArgs),

    /// Validate, encode and write form values to a tag file
    Write(commands::write::WriteArgs),

    /// Save form values as a JSON file
    Export(commands::export::ExportArgs),

    /// Load a JSON export and show its tag URL
    Import(commands::import::ImportArgs),

    /// Download a document into the tenant's offline cache
    CacheDoc(commands::cache_doc::CacheDocArgs),

    /// Open a document: network first, then cache, then offline page
    OpenDoc(commands::open_doc::OpenDocArgs),

    /// Retry downloads queued while offline
    Drain(commands::drain::DrainArgs),

    /// Precache the core assets for the current cache version
    Install(commands::install::InstallArgs),

    /// Delete caches left over from older versions
    Activate(commands::activate::ActivateArgs),

    /// Rebuild the local store schema from embedded assets
    Rebuild(commands::rebuild::RebuildArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    // 1. Load Config (Fails fast if invalid)
    let config = Config::from_env()?;

    // 2. Parse arguments and route to the correct command
    let cli = Cli::parse();

    match cli.command {
        Commands::Encode(args) => commands::encode::execute(config, args).await?,
        Commands::Decode(args) => commands::decode::execute(config, args).await?,
        Commands::Validate(args) => commands::validate::execute(config, args).await?,
        Commands::Write(args) => commands::write::execute(config, args).await?,
        Commands::Export(args) => commands::export::execute(config, args).await?,
        Commands::Import(args) => commands::import::execute(config, args).await?,
        Commands::CacheDoc(args) => commands::cache_doc::execute(config, args).await?,
        Commands::OpenDoc(args) => commands::open_doc::execute(config, args).await?,
        Commands::Drain(args) => commands::drain::execute(config, args).await?,
        Commands::Install(args) => commands::install::execute(config, args).await?,
        Commands::Activate(args) => commands::activate::execute(config, args).await?,
        Commands::Rebuild(args) => {
            let pool = tagforge_db::connect(&config.database_url).await?;
            commands::rebuild::execute(pool, args).await?;
        }
    }

    Ok(())
}
