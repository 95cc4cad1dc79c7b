use anyhow::Result;
use clap::Args;
use tagforge_core::standard_validator;

use super::FormInput;
use crate::config::Config;
use crate::session::Session;

#[derive(Debug, Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub form: FormInput,

    #[arg(long)]
    pub tenant: Option<String>,
}

pub async fn execute(config: Config, args: ValidateArgs) -> Result<()> {
    let session = Session::open(config, args.tenant.as_deref(), None).await?;
    let data = args.form.load(&session.ctx)?;

    println!("🔍 Validating {} field(s)...", data.len());

    let validator = standard_validator(&session.config.base_url, session.config.max_payload);
    let errors = validator.run(&session.ctx, &data);

    if errors.is_empty() {
        println!("🎉 VALIDATION PASSED!");
        println!("The form is ready to be written to a tag.");
    } else {
        println!("⚠️  VALIDATION FAILED: Found {} errors.", errors.len());
        println!("{:-<50}", "-");

        for err in errors {
            println!("🛑 [{}] {}", err.code, err.message);
            if let Some(field) = err.field {
                println!("   Field: {}", field);
            }
        }
        println!("{:-<50}", "-");
    }

    Ok(())
}
