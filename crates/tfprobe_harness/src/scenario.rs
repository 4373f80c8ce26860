//! Staged apply scenario: prerequisite targets first, then the full stack.

use std::path::{Path, PathBuf};

use tracing::info;

use tfprobe_terraform::{fixture, Options, Terraform};

use crate::error::{HarnessError, HarnessResult};
use crate::harness::TestHarness;
use crate::report::TestReport;

/// Integration-test scenario for configurations with a prerequisite
/// module: apply the bootstrap targets alone, then apply the whole
/// configuration, and tear the whole configuration down afterwards no
/// matter how the applies went.
///
/// The teardown is registered before the first apply so that resources
/// left behind by a failed bootstrap are destroyed too; both stages use
/// the stock transient-error retry catalog.
pub struct StagedApply {
    dir: PathBuf,
    bootstrap_targets: Vec<String>,
    keep: bool,
}

impl StagedApply {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            bootstrap_targets: Vec::new(),
            keep: false,
        }
    }

    /// Add a target to apply alone before the full configuration.
    pub fn bootstrap_target(mut self, target: impl Into<String>) -> Self {
        self.bootstrap_targets.push(target.into());
        self
    }

    /// Skip the teardown, leaving resources in place for inspection.
    pub fn keep_resources(mut self) -> Self {
        self.keep = true;
        self
    }

    /// The options for the two stages: (bootstrap, full stack).
    pub fn stage_options(&self) -> (Options, Options) {
        let bootstrap = Options::new(&self.dir)
            .targets(self.bootstrap_targets.iter().cloned())
            .with_default_retryable_errors();
        let full = Options::new(&self.dir).with_default_retryable_errors();
        (bootstrap, full)
    }

    /// Run the scenario against the given terraform handle.
    pub async fn execute(&self, terraform: &Terraform) -> HarnessResult<TestReport> {
        fixture::check(&self.dir)?;

        let (bootstrap, full) = self.stage_options();
        let has_bootstrap = !self.bootstrap_targets.is_empty();

        let mut harness = TestHarness::new(terraform.clone());
        if self.keep {
            info!("Keeping resources after the run; teardown skipped");
        } else {
            harness = harness.defer_destroy("full stack", full.clone());
        }

        let report = harness
            .run(move |terraform| async move {
                if has_bootstrap {
                    info!("Stage 1: applying bootstrap targets {:?}", bootstrap.targets);
                    terraform
                        .init_and_apply(&bootstrap)
                        .await
                        .map_err(|e| HarnessError::BootstrapFailed(e.to_string()))?;
                }

                info!("Stage 2: applying full configuration");
                terraform.init_and_apply(&full).await?;
                Ok(())
            })
            .await;

        info!("Scenario finished: {}", report.summary());
        Ok(report)
    }
}
