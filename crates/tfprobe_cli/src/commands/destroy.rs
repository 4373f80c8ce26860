//! Destroy command - tear down a configuration's resources.

use anyhow::Result;
use clap::Args;
use tracing::info;

use super::StackArgs;

#[derive(Args)]
pub struct DestroyArgs {
    #[command(flatten)]
    stack: StackArgs,
}

pub async fn execute(args: DestroyArgs) -> Result<()> {
    let terraform = args.stack.terraform().await?;
    let options = args.stack.options()?;

    info!("Destroying {}", options.terraform_dir.display());

    let destroyed = terraform.destroy(&options).await?;

    match destroyed.summary {
        Some(summary) => println!("✅ Destroy complete: {} destroyed", summary.destroyed),
        None => println!("✅ Destroy complete"),
    }

    Ok(())
}
