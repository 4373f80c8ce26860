//! Mock executor for testing.
//!
//! Captures every invocation and replays scripted responses, so terraform
//! orchestration can be tested without a terraform binary or a cloud
//! provider.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::error::{ExecError, ExecResult};
use crate::executor::{CommandExecutor, ExecutionResult};
use crate::invocation::{Invocation, RunConfig};

/// Predefined mock response for one invocation.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub exit_code: i64,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
}

impl MockResponse {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
            duration_ms: 100,
        }
    }

    pub fn failure(exit_code: i64, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
            duration_ms: 100,
        }
    }

    pub fn with_duration(mut self, ms: u64) -> Self {
        self.duration_ms = ms;
        self
    }
}

/// Mock executor for testing.
///
/// Responses can be scripted two ways: a global ordered queue consumed by
/// every run, or per-subcommand queues keyed by the invocation's first
/// argument (`init`, `apply`, `destroy`, ...). Keyed queues win; when a
/// keyed queue is down to its last response that response repeats. With no
/// script at all every run succeeds with empty output.
#[derive(Clone)]
pub struct MockExecutor {
    /// Whether the executor should report as available.
    available: Arc<RwLock<bool>>,
    /// Global ordered responses, consumed round-robin.
    responses: Arc<RwLock<Vec<MockResponse>>>,
    /// Index of the next global response.
    response_index: Arc<AtomicUsize>,
    /// Per-subcommand response queues.
    keyed_responses: Arc<RwLock<HashMap<String, VecDeque<MockResponse>>>>,
    /// Every invocation seen, in order.
    captured: Arc<RwLock<Vec<Invocation>>>,
    /// Simulated executor-level failure message.
    simulate_failure: Arc<RwLock<Option<String>>>,
}

impl Default for MockExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExecutor {
    /// Create a new mock executor.
    pub fn new() -> Self {
        Self {
            available: Arc::new(RwLock::new(true)),
            responses: Arc::new(RwLock::new(Vec::new())),
            response_index: Arc::new(AtomicUsize::new(0)),
            keyed_responses: Arc::new(RwLock::new(HashMap::new())),
            captured: Arc::new(RwLock::new(Vec::new())),
            simulate_failure: Arc::new(RwLock::new(None)),
        }
    }

    /// Set whether the executor reports as available.
    pub fn set_available(self, available: bool) -> Self {
        *self.available.write() = available;
        self
    }

    /// Queue a response on the global queue.
    pub fn add_response(self, response: MockResponse) -> Self {
        self.responses.write().push(response);
        self
    }

    /// Queue a response for a specific subcommand.
    pub fn respond_to(self, subcommand: impl Into<String>, response: MockResponse) -> Self {
        self.keyed_responses
            .write()
            .entry(subcommand.into())
            .or_default()
            .push_back(response);
        self
    }

    /// Simulate an executor-level failure on every run.
    pub fn simulate_failure(self, message: impl Into<String>) -> Self {
        *self.simulate_failure.write() = Some(message.into());
        self
    }

    /// Get all captured invocations.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.captured.read().clone()
    }

    /// Get the number of invocations seen.
    pub fn call_count(&self) -> usize {
        self.captured.read().len()
    }

    /// Get the captured subcommands in execution order.
    pub fn subcommands(&self) -> Vec<String> {
        self.captured
            .read()
            .iter()
            .filter_map(|i| i.subcommand().map(str::to_string))
            .collect()
    }

    /// Check if a subcommand was invoked.
    pub fn was_invoked(&self, subcommand: &str) -> bool {
        self.captured
            .read()
            .iter()
            .any(|i| i.subcommand() == Some(subcommand))
    }

    /// Get invocations of a specific subcommand.
    pub fn invocations_of(&self, subcommand: &str) -> Vec<Invocation> {
        self.captured
            .read()
            .iter()
            .filter(|i| i.subcommand() == Some(subcommand))
            .cloned()
            .collect()
    }

    /// Clear captured invocations.
    pub fn clear(&self) {
        self.captured.write().clear();
    }

    fn next_response(&self, invocation: &Invocation) -> MockResponse {
        if let Some(subcommand) = invocation.subcommand() {
            let mut keyed = self.keyed_responses.write();
            if let Some(queue) = keyed.get_mut(subcommand) {
                if queue.len() > 1 {
                    if let Some(response) = queue.pop_front() {
                        return response;
                    }
                } else if let Some(response) = queue.front() {
                    return response.clone();
                }
            }
        }

        let responses = self.responses.read();
        if responses.is_empty() {
            return MockResponse::success("");
        }
        let index = self.response_index.fetch_add(1, Ordering::SeqCst);
        responses
            .get(index % responses.len())
            .cloned()
            .unwrap_or_else(|| MockResponse::success(""))
    }
}

#[async_trait]
impl CommandExecutor for MockExecutor {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn is_available(&self) -> ExecResult<bool> {
        Ok(*self.available.read())
    }

    async fn run(
        &self,
        invocation: &Invocation,
        _run_config: &RunConfig,
    ) -> ExecResult<ExecutionResult> {
        self.captured.write().push(invocation.clone());

        if let Some(message) = self.simulate_failure.read().clone() {
            return Err(ExecError::ExecutionFailed(message));
        }

        let response = self.next_response(invocation);
        let started_at = Utc::now();
        let finished_at = started_at + chrono::Duration::milliseconds(response.duration_ms as i64);

        Ok(ExecutionResult {
            exit_code: response.exit_code,
            stdout: response.stdout,
            stderr: response.stderr,
            started_at,
            finished_at,
            duration_ms: response.duration_ms,
        })
    }
}
