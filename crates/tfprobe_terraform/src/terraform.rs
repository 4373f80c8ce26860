//! Terraform operations with transient-error retry.

use std::sync::Arc;

use tracing::{debug, info, warn};

use tfprobe_exec::{CommandExecutor, ExecutionResult, Invocation, RunConfig};

use crate::args;
use crate::error::{TerraformError, TerraformResult};
use crate::fixture;
use crate::options::Options;
use crate::output::{
    parse_apply_summary, parse_destroy_summary, CommandOutput, PlanOutcome, PlanResult,
};

/// Entry point for terraform operations.
///
/// Holds the execution backend and how long each invocation may run. All
/// operations take an [`Options`] record describing the configuration
/// directory, target restriction and retry policy.
#[derive(Clone)]
pub struct Terraform {
    executor: Arc<dyn CommandExecutor>,
    binary: String,
    run_config: RunConfig,
}

impl Terraform {
    /// Create a terraform handle over an execution backend.
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            executor,
            binary: "terraform".to_string(),
            run_config: RunConfig::default(),
        }
    }

    /// Use a different binary name (e.g. `tofu`).
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Override the run configuration (timeout, output streaming).
    pub fn with_run_config(mut self, run_config: RunConfig) -> Self {
        self.run_config = run_config;
        self
    }

    /// Name of the execution backend in use.
    pub fn backend(&self) -> &'static str {
        self.executor.name()
    }

    /// Check that the execution backend is usable.
    pub async fn is_available(&self) -> TerraformResult<bool> {
        Ok(self.executor.is_available().await?)
    }

    /// Get the terraform version string.
    pub async fn version(&self) -> TerraformResult<String> {
        let invocation = Invocation::new(&self.binary).arg("version");
        let execution = self.executor.run(&invocation, &self.run_config).await?;
        if !execution.success() {
            return Err(TerraformError::NotAvailable(
                execution.last_line().to_string(),
            ));
        }
        Ok(execution
            .stdout
            .lines()
            .next()
            .unwrap_or_default()
            .to_string())
    }

    /// Run `terraform init`.
    pub async fn init(&self, options: &Options) -> TerraformResult<CommandOutput> {
        info!("Running terraform init in {:?}", options.terraform_dir);
        let execution = self.run_with_retry(options, args::init(options)).await?;
        if !execution.success() {
            return Err(TerraformError::InitFailed(
                execution.last_line().to_string(),
            ));
        }
        Ok(CommandOutput {
            summary: None,
            execution,
        })
    }

    /// Run `terraform apply`, restricted to the options' targets when set.
    pub async fn apply(&self, options: &Options) -> TerraformResult<CommandOutput> {
        if options.targets.is_empty() {
            info!("Applying full configuration in {:?}", options.terraform_dir);
        } else {
            info!(
                "Applying {:?} restricted to targets {:?}",
                options.terraform_dir, options.targets
            );
        }

        let execution = self.run_with_retry(options, args::apply(options)).await?;
        if !execution.success() {
            return Err(TerraformError::ApplyFailed(
                execution.last_line().to_string(),
            ));
        }

        let summary = parse_apply_summary(&execution.stdout);
        if let Some(summary) = &summary {
            info!(
                "Apply complete: {} added, {} changed, {} destroyed",
                summary.added, summary.changed, summary.destroyed
            );
        }

        Ok(CommandOutput { execution, summary })
    }

    /// Run `terraform init` followed by `terraform apply`.
    pub async fn init_and_apply(&self, options: &Options) -> TerraformResult<CommandOutput> {
        self.init(options).await?;
        self.apply(options).await
    }

    /// Run `terraform destroy`.
    pub async fn destroy(&self, options: &Options) -> TerraformResult<CommandOutput> {
        info!("Destroying resources in {:?}", options.terraform_dir);

        let execution = self.run_with_retry(options, args::destroy(options)).await?;
        if !execution.success() {
            return Err(TerraformError::DestroyFailed(
                execution.last_line().to_string(),
            ));
        }

        let summary = parse_destroy_summary(&execution.stdout);
        if let Some(summary) = &summary {
            info!("Destroy complete: {} destroyed", summary.destroyed);
        }

        Ok(CommandOutput { execution, summary })
    }

    /// Run `terraform plan -detailed-exitcode`.
    pub async fn plan(&self, options: &Options) -> TerraformResult<PlanResult> {
        info!("Planning {:?}", options.terraform_dir);

        let execution = self.run_with_retry(options, args::plan(options)).await?;
        let outcome = match execution.exit_code {
            0 => PlanOutcome::Clean,
            2 => PlanOutcome::Dirty,
            _ => {
                return Err(TerraformError::PlanFailed(
                    execution.last_line().to_string(),
                ))
            }
        };

        Ok(PlanResult { outcome, execution })
    }

    /// Run `terraform validate`.
    pub async fn validate(&self, options: &Options) -> TerraformResult<CommandOutput> {
        info!("Validating {:?}", options.terraform_dir);

        let execution = self
            .run_with_retry(options, args::validate(options))
            .await?;
        if !execution.success() {
            return Err(TerraformError::ValidateFailed(
                execution.last_line().to_string(),
            ));
        }
        Ok(CommandOutput {
            summary: None,
            execution,
        })
    }

    /// Read a single output value as JSON.
    pub async fn output(
        &self,
        options: &Options,
        name: &str,
    ) -> TerraformResult<serde_json::Value> {
        let execution = self
            .run_in_dir(options, args::output(Some(name)))
            .await?;
        if !execution.success() {
            return Err(TerraformError::OutputFailed(
                execution.last_line().to_string(),
            ));
        }
        serde_json::from_str(&execution.stdout)
            .map_err(|e| TerraformError::OutputParse(e.to_string()))
    }

    /// Read all output values as a JSON object.
    pub async fn output_all(&self, options: &Options) -> TerraformResult<serde_json::Value> {
        let execution = self.run_in_dir(options, args::output(None)).await?;
        if !execution.success() {
            return Err(TerraformError::OutputFailed(
                execution.last_line().to_string(),
            ));
        }
        serde_json::from_str(&execution.stdout)
            .map_err(|e| TerraformError::OutputParse(e.to_string()))
    }

    fn invocation(&self, options: &Options, args: Vec<String>) -> Invocation {
        let mut invocation = Invocation::new(&self.binary)
            .args(args)
            .dir(&options.terraform_dir);
        for (key, value) in &options.env {
            invocation = invocation.env(key, value);
        }
        invocation
    }

    /// Run once in the options' directory, without retry. Used for reads
    /// like `output` where retrying cannot change the answer.
    async fn run_in_dir(
        &self,
        options: &Options,
        args: Vec<String>,
    ) -> TerraformResult<ExecutionResult> {
        fixture::check(&options.terraform_dir)?;
        let invocation = self.invocation(options, args);
        Ok(self.executor.run(&invocation, &self.run_config).await?)
    }

    /// Run an operation, retrying while the failure output matches one of
    /// the options' retryable patterns. A failure that matches no pattern
    /// is returned as-is for the caller to map; a failure that matches but
    /// exhausts its attempts surfaces as `RetriesExhausted`.
    async fn run_with_retry(
        &self,
        options: &Options,
        args: Vec<String>,
    ) -> TerraformResult<ExecutionResult> {
        fixture::check(&options.terraform_dir)?;

        let invocation = self.invocation(options, args);
        let max_attempts = options.retry.max_attempts.max(1);

        for attempt in 0..max_attempts {
            if attempt > 0 {
                let delay = options.retry.backoff_base * (1u32 << (attempt - 1));
                debug!("Backing off {:?} before attempt {}", delay, attempt + 1);
                tokio::time::sleep(delay).await;
            }

            let execution = self.executor.run(&invocation, &self.run_config).await?;
            if execution.success() {
                return Ok(execution);
            }

            let output = execution.combined_output();
            match options.retry.matching(&output) {
                Some(pattern) if attempt + 1 < max_attempts => {
                    warn!(
                        "Transient failure ({}), retrying ({}/{})",
                        pattern.reason,
                        attempt + 1,
                        max_attempts
                    );
                }
                Some(pattern) => {
                    return Err(TerraformError::RetriesExhausted {
                        attempts: max_attempts,
                        last_error: format!("{}: {}", pattern.reason, execution.last_line()),
                    });
                }
                None => return Ok(execution),
            }
        }

        // max_attempts >= 1, so the loop always returns.
        unreachable!("retry loop exited without a result")
    }
}
