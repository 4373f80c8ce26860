//! Validate command - check a configuration for errors.

use anyhow::Result;
use clap::Args;

use super::StackArgs;

#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    stack: StackArgs,
}

pub async fn execute(args: ValidateArgs) -> Result<()> {
    let terraform = args.stack.terraform().await?;
    let options = args.stack.options()?;

    println!("📋 Validating {}...", options.terraform_dir.display());

    terraform.init(&options).await?;
    terraform.validate(&options).await?;

    println!("✅ Configuration is valid");
    Ok(())
}
