//! Output command - read configuration outputs as JSON.

use anyhow::Result;
use clap::Args;

use super::StackArgs;

#[derive(Args)]
pub struct OutputArgs {
    #[command(flatten)]
    stack: StackArgs,

    /// Specific output to read; all outputs when omitted
    name: Option<String>,
}

pub async fn execute(args: OutputArgs) -> Result<()> {
    let terraform = args.stack.terraform().await?;
    let options = args.stack.options()?;

    let value = match &args.name {
        Some(name) => terraform.output(&options, name).await?,
        None => terraform.output_all(&options).await?,
    };

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
