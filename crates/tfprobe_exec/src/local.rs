//! Local process executor.
//!
//! Spawns the tool directly on the host, captures stdout/stderr on reader
//! threads, and enforces the run timeout by polling the child process.

use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, Stdio};
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, error, info};

use crate::error::{ExecError, ExecResult};
use crate::executor::{CommandExecutor, ExecutionResult};
use crate::invocation::{Invocation, RunConfig};

/// Options for the local executor.
#[derive(Debug, Clone, Default)]
pub struct LocalExecutorOptions {
    /// Print commands without executing them
    pub dry_run: bool,
}

impl LocalExecutorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }
}

/// Executor that spawns commands directly on the host.
pub struct LocalExecutor {
    options: LocalExecutorOptions,
}

impl Default for LocalExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalExecutor {
    /// Create a local executor with default options.
    pub fn new() -> Self {
        Self {
            options: LocalExecutorOptions::default(),
        }
    }

    pub fn with_options(options: LocalExecutorOptions) -> Self {
        Self { options }
    }

    /// Check if dry-run mode is enabled.
    pub fn is_dry_run(&self) -> bool {
        self.options.dry_run
    }

    fn spawn(&self, invocation: &Invocation) -> ExecResult<Child> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        if let Some(dir) = &invocation.dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &invocation.env {
            cmd.env(key, value);
        }

        cmd.spawn()
            .map_err(|e| ExecError::SpawnFailed(invocation.program.clone(), e.to_string()))
    }

    fn collect<R: Read + Send + 'static>(
        reader: R,
        stream_output: bool,
        to_stderr: bool,
    ) -> std::thread::JoinHandle<String> {
        std::thread::spawn(move || {
            let reader = BufReader::new(reader);
            let mut output = String::new();
            for line in reader.lines().map_while(Result::ok) {
                output.push_str(&line);
                output.push('\n');
                if stream_output {
                    if to_stderr {
                        eprintln!("{}", line);
                    } else {
                        println!("{}", line);
                    }
                }
            }
            output
        })
    }

    fn wait_with_timeout(child: &mut Child, timeout_seconds: u64) -> ExecResult<i64> {
        if timeout_seconds == 0 {
            let status = child
                .wait()
                .map_err(|e| ExecError::ExecutionFailed(format!("Failed to wait: {}", e)))?;
            return Ok(status.code().unwrap_or(-1) as i64);
        }

        let timeout = std::time::Duration::from_secs(timeout_seconds);
        let start = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status.code().unwrap_or(-1) as i64),
                Ok(None) => {
                    if start.elapsed() > timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(ExecError::Timeout(timeout_seconds));
                    }
                    std::thread::sleep(std::time::Duration::from_millis(100));
                }
                Err(e) => {
                    return Err(ExecError::ExecutionFailed(format!(
                        "Failed to wait for process: {}",
                        e
                    )));
                }
            }
        }
    }
}

#[async_trait]
impl CommandExecutor for LocalExecutor {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn is_available(&self) -> ExecResult<bool> {
        // The host itself is always usable; whether a particular binary
        // exists surfaces as a spawn failure on the first run.
        Ok(true)
    }

    async fn run(
        &self,
        invocation: &Invocation,
        run_config: &RunConfig,
    ) -> ExecResult<ExecutionResult> {
        let cmd_str = invocation.command_line();
        debug!("Executing: {}", cmd_str);

        if self.options.dry_run {
            info!("[DRY-RUN] Would execute: {}", cmd_str);
            let now = Utc::now();
            return Ok(ExecutionResult {
                exit_code: 0,
                stdout: format!("[DRY-RUN] Command: {}", cmd_str),
                stderr: String::new(),
                started_at: now,
                finished_at: now,
                duration_ms: 0,
            });
        }

        let started_at = Utc::now();
        let mut child = self.spawn(invocation)?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ExecError::ExecutionFailed("stdout not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ExecError::ExecutionFailed("stderr not captured".to_string()))?;

        let stdout_handle = Self::collect(stdout, run_config.stream_output, false);
        let stderr_handle = Self::collect(stderr, run_config.stream_output, true);

        let exit_code = Self::wait_with_timeout(&mut child, run_config.timeout_seconds)?;

        let stdout_output = stdout_handle.join().unwrap_or_default();
        let stderr_output = stderr_handle.join().unwrap_or_default();

        let finished_at = Utc::now();
        let duration_ms = (finished_at - started_at).num_milliseconds() as u64;

        if exit_code == 0 {
            debug!("Command completed successfully in {}ms", duration_ms);
        } else {
            error!(
                "Command failed with exit code {} after {}ms",
                exit_code, duration_ms
            );
        }

        Ok(ExecutionResult {
            exit_code,
            stdout: stdout_output,
            stderr: stderr_output,
            started_at,
            finished_at,
            duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_does_not_execute() {
        let executor = LocalExecutor::with_options(LocalExecutorOptions::new().dry_run());
        assert!(executor.is_dry_run());

        let invocation = Invocation::new("definitely-not-a-real-binary").arg("apply");
        let result = executor
            .run(&invocation, &RunConfig::default())
            .await
            .unwrap();

        assert_eq!(result.exit_code, 0);
        assert!(result.stdout.contains("[DRY-RUN]"));
    }

    #[tokio::test]
    async fn test_spawn_failure_names_the_program() {
        let executor = LocalExecutor::new();
        let invocation = Invocation::new("definitely-not-a-real-binary");

        let err = executor
            .run(&invocation, &RunConfig::default())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("definitely-not-a-real-binary"));
    }
}
