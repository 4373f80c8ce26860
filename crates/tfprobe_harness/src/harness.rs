//! Test harness with guaranteed teardown.

use std::future::Future;

use tracing::{error, info, warn};

use tfprobe_terraform::{Options, Terraform};

use crate::error::HarnessResult;
use crate::report::{TeardownFailure, TestOutcome, TestReport};

struct Teardown {
    label: String,
    options: Options,
}

/// Runs a test body and then destroys everything registered with
/// [`defer_destroy`](TestHarness::defer_destroy), in LIFO order, on every
/// exit path. The body is executed on its own task so a panic inside it is
/// contained and teardown still runs.
///
/// Teardowns are registered up front, before the body runs, so resources
/// created by a partially-failed apply are still cleaned up.
pub struct TestHarness {
    terraform: Terraform,
    teardowns: Vec<Teardown>,
}

impl TestHarness {
    pub fn new(terraform: Terraform) -> Self {
        Self {
            terraform,
            teardowns: Vec::new(),
        }
    }

    /// Register a destroy to run after the body, last registered first.
    pub fn defer_destroy(mut self, label: impl Into<String>, options: Options) -> Self {
        self.teardowns.push(Teardown {
            label: label.into(),
            options,
        });
        self
    }

    /// The terraform handle the harness runs against.
    pub fn terraform(&self) -> &Terraform {
        &self.terraform
    }

    /// Run the body, then every registered teardown.
    ///
    /// Teardown failures do not abort the remaining teardowns; they are
    /// collected on the report, and any one of them fails the run.
    pub async fn run<F, Fut>(self, body: F) -> TestReport
    where
        F: FnOnce(Terraform) -> Fut,
        Fut: Future<Output = HarnessResult<()>> + Send + 'static,
    {
        let TestHarness {
            terraform,
            teardowns,
        } = self;

        let handle = tokio::spawn(body(terraform.clone()));
        let outcome = match handle.await {
            Ok(Ok(())) => TestOutcome::Passed,
            Ok(Err(err)) => {
                error!("Test body failed: {}", err);
                TestOutcome::Failed(err.to_string())
            }
            Err(join_err) if join_err.is_panic() => {
                let message = panic_message(join_err.into_panic());
                error!("Test body panicked: {}", message);
                TestOutcome::Panicked(message)
            }
            Err(_) => TestOutcome::Failed("test body was cancelled".to_string()),
        };

        let mut teardown_failures = Vec::new();
        for teardown in teardowns.into_iter().rev() {
            info!("Tearing down: {}", teardown.label);
            match terraform.destroy(&teardown.options).await {
                Ok(destroyed) => {
                    if let Some(summary) = destroyed.summary {
                        info!(
                            "Teardown {} destroyed {} resource(s)",
                            teardown.label, summary.destroyed
                        );
                    }
                }
                Err(err) => {
                    warn!("Teardown {} failed: {}", teardown.label, err);
                    teardown_failures.push(TeardownFailure {
                        label: teardown.label,
                        error: err.to_string(),
                    });
                }
            }
        }

        TestReport {
            outcome,
            teardown_failures,
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "opaque panic payload".to_string()
    }
}
