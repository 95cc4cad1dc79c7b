use anyhow::Result;
use clap::Args;
use tagforge_core::codec::payload_size;

use super::FormInput;
use crate::config::Config;
use crate::session::Session;

#[derive(Debug, Args)]
pub struct EncodeArgs {
    #[command(flatten)]
    pub form: FormInput,

    /// Tenant whose schema is used (defaults to the persisted selection)
    #[arg(long)]
    pub tenant: Option<String>,
}

pub async fn execute(config: Config, args: EncodeArgs) -> Result<()> {
    let session = Session::open(config, args.tenant.as_deref(), None).await?;
    let data = args.form.load(&session.ctx)?;

    let url = session.ctx.encode(&data, &session.config.base_url);
    let size = payload_size(&url);

    println!("🔗 {}", url);
    println!("📏 Payload: {} / {} bytes", size, session.config.max_payload);
    if size > session.config.max_payload {
        println!("⚠️  Too large for the tag. Shorten some values.");
    }
    Ok(())
}
