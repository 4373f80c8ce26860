//! Error types for the harness.

use thiserror::Error;

/// Result type alias for harness operations.
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Errors that can occur while orchestrating a test.
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Bootstrap apply failed: {0}")]
    BootstrapFailed(String),

    #[error("Test body failed: {0}")]
    TestFailed(String),

    #[error("Terraform error: {0}")]
    Terraform(#[from] tfprobe_terraform::TerraformError),

    #[error("Executor error: {0}")]
    Exec(#[from] tfprobe_exec::ExecError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
