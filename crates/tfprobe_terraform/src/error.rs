//! Error types for terraform operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for terraform operations.
pub type TerraformResult<T> = Result<T, TerraformError>;

/// Errors that can occur during terraform operations.
#[derive(Error, Debug)]
pub enum TerraformError {
    #[error("Terraform not available: {0}")]
    NotAvailable(String),

    #[error("Terraform init failed: {0}")]
    InitFailed(String),

    #[error("Terraform apply failed: {0}")]
    ApplyFailed(String),

    #[error("Terraform destroy failed: {0}")]
    DestroyFailed(String),

    #[error("Terraform plan failed: {0}")]
    PlanFailed(String),

    #[error("Terraform validate failed: {0}")]
    ValidateFailed(String),

    #[error("Terraform output failed: {0}")]
    OutputFailed(String),

    #[error("Failed to parse terraform output: {0}")]
    OutputParse(String),

    #[error("Configuration directory not found: {}", .0.display())]
    MissingFixture(PathBuf),

    #[error("Configuration directory contains no terraform files: {}", .0.display())]
    EmptyFixture(PathBuf),

    #[error("Operation failed after {attempts} attempts, last error: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    #[error("Executor error: {0}")]
    Exec(#[from] tfprobe_exec::ExecError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
