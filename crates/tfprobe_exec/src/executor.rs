//! Executor trait and execution result types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ExecResult;
use crate::invocation::{Invocation, RunConfig};

/// Result of a command execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Exit code of the process
    pub exit_code: i64,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
    /// Execution start time
    pub started_at: DateTime<Utc>,
    /// Execution end time
    pub finished_at: DateTime<Utc>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl ExecutionResult {
    /// Check if execution was successful (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Get combined output (stdout + stderr).
    pub fn combined_output(&self) -> String {
        if self.stdout.is_empty() {
            self.stderr.clone()
        } else if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }

    /// Last non-empty output line, preferring stderr. Terraform prints its
    /// error summary there.
    pub fn last_line(&self) -> &str {
        self.stderr
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .or_else(|| self.stdout.lines().rev().find(|l| !l.trim().is_empty()))
            .unwrap_or("(no output)")
    }
}

/// Command executor trait.
///
/// A non-zero exit code is not an error at this layer; callers decide what
/// a failed invocation means. Errors are reserved for the executor itself
/// failing (spawn failure, timeout, daemon unreachable).
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Short backend name for logging ("local", "docker", "mock").
    fn name(&self) -> &'static str;

    /// Check if the backend is usable.
    async fn is_available(&self) -> ExecResult<bool>;

    /// Execute an invocation and capture its output.
    async fn run(&self, invocation: &Invocation, run_config: &RunConfig)
        -> ExecResult<ExecutionResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(exit_code: i64, stdout: &str, stderr: &str) -> ExecutionResult {
        let now = Utc::now();
        ExecutionResult {
            exit_code,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            started_at: now,
            finished_at: now,
            duration_ms: 0,
        }
    }

    #[test]
    fn test_success() {
        assert!(result(0, "", "").success());
        assert!(!result(1, "", "").success());
    }

    #[test]
    fn test_combined_output() {
        assert_eq!(result(0, "out", "").combined_output(), "out");
        assert_eq!(result(0, "", "err").combined_output(), "err");
        assert_eq!(result(0, "out", "err").combined_output(), "out\nerr");
    }

    #[test]
    fn test_last_line_prefers_stderr() {
        let r = result(1, "Initializing...\n", "Error: something broke\n\n");
        assert_eq!(r.last_line(), "Error: something broke");

        let r = result(0, "Apply complete!\n", "");
        assert_eq!(r.last_line(), "Apply complete!");

        assert_eq!(result(0, "", "").last_line(), "(no output)");
    }
}
