//! Test outcome reporting.

use serde::{Deserialize, Serialize};

/// How the test body finished.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "detail")]
pub enum TestOutcome {
    /// Body returned cleanly
    Passed,
    /// Body returned an error
    Failed(String),
    /// Body panicked; the panic was contained and teardown still ran
    Panicked(String),
}

/// A teardown that did not complete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeardownFailure {
    /// Label the teardown was registered under
    pub label: String,
    /// Error message from the destroy
    pub error: String,
}

/// Report of a harness run: the body outcome plus any teardown failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestReport {
    pub outcome: TestOutcome,
    pub teardown_failures: Vec<TeardownFailure>,
}

impl TestReport {
    /// A run passes only if the body passed and every teardown completed.
    pub fn passed(&self) -> bool {
        self.outcome == TestOutcome::Passed && self.teardown_failures.is_empty()
    }

    /// One-line summary for logs and CLI output.
    pub fn summary(&self) -> String {
        let body = match &self.outcome {
            TestOutcome::Passed => "passed".to_string(),
            TestOutcome::Failed(err) => format!("failed: {}", err),
            TestOutcome::Panicked(err) => format!("panicked: {}", err),
        };
        if self.teardown_failures.is_empty() {
            body
        } else {
            format!("{} ({} teardown failure(s))", body, self.teardown_failures.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passed_requires_clean_teardowns() {
        let clean = TestReport {
            outcome: TestOutcome::Passed,
            teardown_failures: Vec::new(),
        };
        assert!(clean.passed());

        let leaky = TestReport {
            outcome: TestOutcome::Passed,
            teardown_failures: vec![TeardownFailure {
                label: "full stack".to_string(),
                error: "destroy failed".to_string(),
            }],
        };
        assert!(!leaky.passed());
        assert!(leaky.summary().contains("teardown failure"));
    }

    #[test]
    fn test_failed_summary_carries_the_error() {
        let report = TestReport {
            outcome: TestOutcome::Failed("apply exploded".to_string()),
            teardown_failures: Vec::new(),
        };
        assert!(!report.passed());
        assert!(report.summary().contains("apply exploded"));
    }
}
