//! # tfprobe_exec
//!
//! Command execution backends for tfprobe.
//!
//! This crate abstracts how external tool invocations (the terraform CLI)
//! are executed: directly on the host, inside the official terraform
//! container image, or against a scripted mock for tests.
//!
//! # Features
//!
//! - **Local execution**: spawn the binary on the host with streamed capture
//! - **Containerized execution**: run inside `hashicorp/terraform` via the Docker API
//! - **Mock executor**: scripted responses and captured invocations for tests
//! - **Timeouts**: every run is bounded; long applies get a generous default
//!
//! # Example
//!
//! ```rust,no_run
//! use tfprobe_exec::{CommandExecutor, Invocation, LocalExecutor, RunConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let executor = LocalExecutor::new();
//!
//!     let invocation = Invocation::new("terraform")
//!         .arg("version")
//!         .dir("./unit-test");
//!
//!     let result = executor.run(&invocation, &RunConfig::default()).await?;
//!     println!("Exit code: {}", result.exit_code);
//!
//!     Ok(())
//! }
//! ```

pub mod docker;
pub mod error;
pub mod executor;
pub mod invocation;
pub mod local;
pub mod mock;

pub use docker::DockerExecutor;
pub use error::{ExecError, ExecResult};
pub use executor::{CommandExecutor, ExecutionResult};
pub use invocation::{Invocation, RunConfig};
pub use local::{LocalExecutor, LocalExecutorOptions};
pub use mock::{MockExecutor, MockResponse};
