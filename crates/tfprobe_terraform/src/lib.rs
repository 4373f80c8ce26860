//! # tfprobe_terraform
//!
//! Terraform operations for tfprobe.
//!
//! This crate wraps the terraform CLI behind a typed API: build an
//! [`Options`] record pointing at a configuration directory (optionally
//! restricted to named module targets), then run init/apply/plan/destroy
//! through a [`Terraform`] handle. Failures whose output matches a
//! known-transient pattern are retried with exponential backoff.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use tfprobe_exec::LocalExecutor;
//! use tfprobe_terraform::{Options, Terraform};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let terraform = Terraform::new(Arc::new(LocalExecutor::new()));
//!
//!     // Apply only the VPC module, retrying known-transient provider errors.
//!     let options = Options::new("./unit-test")
//!         .target("module.vpc")
//!         .with_default_retryable_errors();
//!
//!     let applied = terraform.init_and_apply(&options).await?;
//!     if let Some(summary) = applied.summary {
//!         println!("Resources added: {}", summary.added);
//!     }
//!
//!     terraform.destroy(&options).await?;
//!     Ok(())
//! }
//! ```

pub mod args;
pub mod error;
pub mod fixture;
pub mod options;
pub mod output;
pub mod terraform;

pub use error::{TerraformError, TerraformResult};
pub use options::{Options, RetryPolicy, RetryablePattern};
pub use output::{ApplySummary, CommandOutput, PlanOutcome, PlanResult};
pub use terraform::Terraform;
