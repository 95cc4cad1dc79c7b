use anyhow::{bail, Result};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tagforge_service::nfc::FileTagTransport;
use tagforge_service::{WriteOrchestrator, WriteOutcome};

use super::{print_log, FormInput};
use crate::config::Config;
use crate::session::Session;

#[derive(Debug, Args)]
pub struct WriteArgs {
    #[command(flatten)]
    pub form: FormInput,

    /// File standing in for the NFC tag
    #[arg(long, default_value = "tag.json")]
    pub tag: PathBuf,

    /// Emulated tag memory in bytes
    #[arg(long)]
    pub capacity: Option<usize>,

    #[arg(long)]
    pub tenant: Option<String>,
}

pub async fn execute(config: Config, args: WriteArgs) -> Result<()> {
    let session = Session::open(config, args.tenant.as_deref(), None).await?;
    let data = args.form.load(&session.ctx)?;

    let mut transport = FileTagTransport::new(&args.tag);
    if let Some(capacity) = args.capacity {
        transport = transport.with_capacity(capacity);
    }

    println!("📡 Writing tag {:?}...", args.tag);
    let nfc = WriteOrchestrator::new(Arc::new(transport), session.write_config(), session.log.clone());
    let outcome = nfc.trigger(&session.ctx, &data).await;
    print_log(&session.log);

    match outcome {
        WriteOutcome::Written { url, attempts } => {
            println!("🎉 Tag written after {} attempt(s): {}", attempts, url);
            Ok(())
        }
        WriteOutcome::Invalid(errors) => bail!("Form is invalid ({} errors)", errors.len()),
        WriteOutcome::Failed { error, message, .. } => bail!("Write failed ({}): {}", error.name(), message),
        WriteOutcome::Ignored | WriteOutcome::Aborted => bail!("Write did not run"),
    }
}
