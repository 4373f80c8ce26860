//! CLI command definitions.
//!
//! Each subcommand maps to one terraform operation, plus `test` which runs
//! the staged targeted-apply scenario with guaranteed teardown.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};

use tfprobe_exec::{DockerExecutor, LocalExecutor, RunConfig};
use tfprobe_terraform::{Options, Terraform};

pub mod apply;
pub mod destroy;
pub mod output;
pub mod plan;
pub mod test;
pub mod validate;

/// tfprobe - terraform test harness
#[derive(Parser)]
#[command(name = "tfprobe")]
#[command(version, about = "tfprobe - apply, verify and tear down terraform configurations")]
#[command(long_about = r#"
tfprobe drives the terraform CLI for integration testing: apply a
configuration (optionally restricted to named modules), verify it, and
guarantee teardown afterwards.

COMMANDS:
  apply     → terraform init + apply, optionally restricted to targets
  destroy   → terraform destroy
  plan      → terraform plan, reporting whether changes are pending
  validate  → terraform validate
  output    → read configuration outputs as JSON
  test      → staged scenario: apply bootstrap targets, apply the full
              configuration, then destroy everything

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Test failure
  4 - Terraform operation error
  5 - Executor unavailable
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply a terraform configuration
    Apply(apply::ApplyArgs),

    /// Destroy a terraform configuration's resources
    Destroy(destroy::DestroyArgs),

    /// Plan a terraform configuration and report pending changes
    Plan(plan::PlanArgs),

    /// Validate a terraform configuration
    Validate(validate::ValidateArgs),

    /// Read terraform outputs as JSON
    Output(output::OutputArgs),

    /// Run the staged apply scenario with guaranteed teardown
    Test(test::TestArgs),
}

/// Execution backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Run the terraform binary on the host
    Local,
    /// Run terraform inside the official container image
    Docker,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Local => write!(f, "local"),
            Backend::Docker => write!(f, "docker"),
        }
    }
}

/// Options shared by every terraform-driving command.
#[derive(Args)]
pub struct StackArgs {
    /// Directory containing the terraform configuration
    #[arg(short, long)]
    pub dir: PathBuf,

    /// Restrict the operation to a module or resource address (repeatable)
    #[arg(short, long)]
    pub target: Vec<String>,

    /// Input variable as KEY=VALUE (repeatable)
    #[arg(long = "var", value_name = "KEY=VALUE")]
    pub vars: Vec<String>,

    /// Disable transient-error retries
    #[arg(long)]
    pub no_retry: bool,

    /// Execution backend
    #[arg(long, value_enum, default_value_t = Backend::Local)]
    pub backend: Backend,

    /// Timeout for each terraform invocation, in seconds
    #[arg(long, default_value_t = 3600)]
    pub timeout: u64,

    /// Stream terraform output while it runs
    #[arg(long)]
    pub stream: bool,
}

impl StackArgs {
    /// Build the terraform handle for the selected backend.
    pub async fn terraform(&self) -> anyhow::Result<Terraform> {
        build_terraform(self.backend, self.timeout, self.stream).await
    }

    /// Build the operation options from the flags.
    pub fn options(&self) -> anyhow::Result<Options> {
        let mut options = Options::new(&self.dir).targets(self.target.iter().cloned());
        if !self.no_retry {
            options = options.with_default_retryable_errors();
        }
        for var in &self.vars {
            let (key, value) = var
                .split_once('=')
                .with_context(|| format!("invalid --var '{}', expected KEY=VALUE", var))?;
            options = options.var(key, parse_var_value(value));
        }
        Ok(options)
    }
}

pub(crate) async fn build_terraform(
    backend: Backend,
    timeout: u64,
    stream: bool,
) -> anyhow::Result<Terraform> {
    let mut run_config = RunConfig::default().timeout(timeout);
    if stream {
        run_config = run_config.stream();
    }

    let terraform = match backend {
        Backend::Local => Terraform::new(Arc::new(LocalExecutor::new())),
        Backend::Docker => {
            let executor = DockerExecutor::new()
                .await
                .context("Docker daemon unavailable")?;
            Terraform::new(Arc::new(executor))
        }
    };

    Ok(terraform.with_run_config(run_config))
}

/// Interpret a variable value: valid JSON is passed through typed, anything
/// else is a plain string.
fn parse_var_value(value: &str) -> serde_json::Value {
    serde_json::from_str(value).unwrap_or_else(|_| serde_json::Value::String(value.to_string()))
}
