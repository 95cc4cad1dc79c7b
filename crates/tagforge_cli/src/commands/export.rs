use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use super::FormInput;
use crate::config::Config;
use crate::session::Session;

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub form: FormInput,

    /// Output file (default: tagforge-YYYY-MM-DD.json)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub tenant: Option<String>,
}

pub async fn execute(config: Config, args: ExportArgs) -> Result<()> {
    let session = Session::open(config, args.tenant.as_deref(), None).await?;
    let data = args.form.load(&session.ctx)?;

    let output = args.output.unwrap_or_else(|| {
        PathBuf::from(format!("tagforge-{}.json", chrono::Local::now().format("%Y-%m-%d")))
    });

    let json = data.to_pretty_json()?;
    std::fs::write(&output, json).with_context(|| format!("Failed to write {:?}", output))?;

    println!("💾 Exported {} field(s) to {:?}", data.len(), output);
    Ok(())
}
