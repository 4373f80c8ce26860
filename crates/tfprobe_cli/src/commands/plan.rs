//! Plan command - report whether a configuration has pending changes.

use anyhow::Result;
use clap::Args;

use super::StackArgs;

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    stack: StackArgs,

    /// Fail (exit non-zero) when changes are pending
    #[arg(long)]
    fail_on_changes: bool,
}

pub async fn execute(args: PlanArgs) -> Result<()> {
    let terraform = args.stack.terraform().await?;
    let options = args.stack.options()?;

    let plan = terraform.plan(&options).await?;

    if plan.has_changes() {
        println!("⚠️  Plan has pending changes");
        if args.fail_on_changes {
            anyhow::bail!("plan detected pending changes");
        }
    } else {
        println!("✅ No changes, infrastructure matches the configuration");
    }

    Ok(())
}
