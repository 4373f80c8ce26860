//! # tfprobe_harness
//!
//! Test orchestration for terraform configurations.
//!
//! The harness runs a test body against real (or mocked) infrastructure
//! and guarantees that every registered destroy runs afterwards, whether
//! the body returned cleanly, failed, or panicked. [`StagedApply`] builds
//! on it to express the common "apply the prerequisite module first, then
//! the whole configuration" integration test.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use tfprobe_exec::LocalExecutor;
//! use tfprobe_harness::StagedApply;
//! use tfprobe_terraform::Terraform;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let terraform = Terraform::new(Arc::new(LocalExecutor::new()));
//!
//!     let report = StagedApply::new("./unit-test")
//!         .bootstrap_target("module.vpc")
//!         .execute(&terraform)
//!         .await?;
//!
//!     assert!(report.passed());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod harness;
pub mod report;
pub mod scenario;
pub mod workspace;

pub use error::{HarnessError, HarnessResult};
pub use harness::TestHarness;
pub use report::{TeardownFailure, TestOutcome, TestReport};
pub use scenario::StagedApply;
pub use workspace::FixtureWorkspace;
