//! Test command - run the staged apply scenario with guaranteed teardown.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use tfprobe_harness::{FixtureWorkspace, StagedApply, TestOutcome};

use super::{build_terraform, Backend};

#[derive(Args)]
pub struct TestArgs {
    /// Directory containing the terraform configuration
    #[arg(short, long)]
    dir: PathBuf,

    /// Module to apply alone before the full configuration (repeatable)
    #[arg(short = 't', long = "bootstrap-target")]
    bootstrap_targets: Vec<String>,

    /// Leave resources in place after the run
    #[arg(long)]
    keep: bool,

    /// Run against a private copy of the configuration directory
    #[arg(long)]
    copy_fixture: bool,

    /// Execution backend
    #[arg(long, value_enum, default_value_t = Backend::Local)]
    backend: Backend,

    /// Timeout for each terraform invocation, in seconds
    #[arg(long, default_value_t = 3600)]
    timeout: u64,

    /// Stream terraform output while it runs
    #[arg(long)]
    stream: bool,
}

pub async fn execute(args: TestArgs) -> Result<()> {
    let terraform = build_terraform(args.backend, args.timeout, args.stream).await?;

    // Optionally isolate the run from local state in the fixture dir.
    let workspace;
    let dir = if args.copy_fixture {
        workspace = FixtureWorkspace::copy_from(&args.dir)?;
        workspace.path().to_path_buf()
    } else {
        args.dir.clone()
    };

    let mut scenario = StagedApply::new(&dir);
    for target in &args.bootstrap_targets {
        scenario = scenario.bootstrap_target(target);
    }
    if args.keep {
        scenario = scenario.keep_resources();
    }

    if args.bootstrap_targets.is_empty() {
        println!("🏗️  Applying {}", dir.display());
    } else {
        println!(
            "🏗️  Applying {} (bootstrap: {})",
            dir.display(),
            args.bootstrap_targets.join(", ")
        );
    }

    let report = scenario.execute(&terraform).await?;

    match &report.outcome {
        TestOutcome::Passed => println!("✅ Test body passed"),
        TestOutcome::Failed(err) => println!("❌ Test body failed: {}", err),
        TestOutcome::Panicked(err) => println!("❌ Test body panicked: {}", err),
    }
    for failure in &report.teardown_failures {
        println!("⚠️  Teardown '{}' failed: {}", failure.label, failure.error);
    }

    if !report.passed() {
        anyhow::bail!("staged apply did not pass");
    }

    println!("✅ All stages applied and torn down");
    Ok(())
}
