//! Example: staged apply of a VPC fixture
//!
//! Applies the fixture's VPC module on its own, then the full
//! configuration, and tears everything down afterwards. Requires a
//! terraform binary on PATH.
//!
//! Run with: cargo run --example staged_vpc_test

use std::path::PathBuf;
use std::sync::Arc;

use tfprobe_exec::LocalExecutor;
use tfprobe_harness::{FixtureWorkspace, StagedApply};
use tfprobe_terraform::Terraform;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("=== tfprobe staged apply example ===\n");

    let terraform = Terraform::new(Arc::new(LocalExecutor::new()));

    let version = match terraform.version().await {
        Ok(version) => version,
        Err(e) => {
            println!("terraform not available ({}), nothing to do", e);
            return Ok(());
        }
    };
    println!("Using {}", version);

    // Work on a private copy so repeated runs never share state.
    let fixture = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/unit-test");
    let workspace = FixtureWorkspace::copy_from(&fixture)?;
    println!("Fixture copied to {}", workspace.path().display());

    let report = StagedApply::new(workspace.path())
        .bootstrap_target("module.vpc")
        .execute(&terraform)
        .await?;

    println!("\nResult: {}", report.summary());
    if !report.passed() {
        anyhow::bail!("staged apply did not pass");
    }

    Ok(())
}
