//! Apply command - init and apply a configuration.

use anyhow::Result;
use clap::Args;
use tracing::info;

use super::StackArgs;

#[derive(Args)]
pub struct ApplyArgs {
    #[command(flatten)]
    stack: StackArgs,
}

pub async fn execute(args: ApplyArgs) -> Result<()> {
    let terraform = args.stack.terraform().await?;
    let options = args.stack.options()?;

    info!(
        "Applying {} via {} backend",
        options.terraform_dir.display(),
        terraform.backend()
    );

    let applied = terraform.init_and_apply(&options).await?;

    match applied.summary {
        Some(summary) => println!(
            "✅ Apply complete: {} added, {} changed, {} destroyed",
            summary.added, summary.changed, summary.destroyed
        ),
        None => println!("✅ Apply complete"),
    }

    Ok(())
}
