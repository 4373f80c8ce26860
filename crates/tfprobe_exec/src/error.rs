//! Error types for the execution layer.

use thiserror::Error;

/// Result type alias for executor operations.
pub type ExecResult<T> = Result<T, ExecError>;

/// Errors that can occur while executing external commands.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("Failed to spawn {0}: {1}")]
    SpawnFailed(String, String),

    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Command timed out after {0} seconds")]
    Timeout(u64),

    #[error("Image pull failed: {0}")]
    ImagePullFailed(String),

    #[error("Docker API error: {0}")]
    DockerApi(#[from] bollard::errors::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
