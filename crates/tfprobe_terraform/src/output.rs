//! Parsing of terraform's human-readable summaries.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tfprobe_exec::ExecutionResult;

/// Resource counts reported by apply/destroy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplySummary {
    pub added: u32,
    pub changed: u32,
    pub destroyed: u32,
}

fn apply_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Apply complete! Resources: (\d+) added, (\d+) changed, (\d+) destroyed")
            .expect("stock pattern is valid")
    })
}

fn destroy_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Destroy complete! Resources: (\d+) destroyed").expect("stock pattern is valid")
    })
}

/// Parse the `Apply complete!` trailer, if present.
pub fn parse_apply_summary(output: &str) -> Option<ApplySummary> {
    let captures = apply_re().captures(output)?;
    Some(ApplySummary {
        added: captures[1].parse().ok()?,
        changed: captures[2].parse().ok()?,
        destroyed: captures[3].parse().ok()?,
    })
}

/// Parse the `Destroy complete!` trailer, if present.
pub fn parse_destroy_summary(output: &str) -> Option<ApplySummary> {
    let captures = destroy_re().captures(output)?;
    Some(ApplySummary {
        added: 0,
        changed: 0,
        destroyed: captures[1].parse().ok()?,
    })
}

/// Result of a terraform operation: the raw execution plus the parsed
/// resource summary when the output carried one.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub execution: ExecutionResult,
    pub summary: Option<ApplySummary>,
}

impl CommandOutput {
    pub fn stdout(&self) -> &str {
        &self.execution.stdout
    }
}

/// Outcome of `terraform plan -detailed-exitcode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanOutcome {
    /// No changes pending
    Clean,
    /// The plan contains pending changes
    Dirty,
}

/// Result of a plan operation.
#[derive(Debug, Clone)]
pub struct PlanResult {
    pub outcome: PlanOutcome,
    pub execution: ExecutionResult,
}

impl PlanResult {
    pub fn has_changes(&self) -> bool {
        self.outcome == PlanOutcome::Dirty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_apply_summary() {
        let output = "\nmodule.vpc.null_resource.network: Creation complete after 0s\n\
                      \nApply complete! Resources: 3 added, 1 changed, 0 destroyed.\n";

        let summary = parse_apply_summary(output).unwrap();
        assert_eq!(
            summary,
            ApplySummary {
                added: 3,
                changed: 1,
                destroyed: 0
            }
        );
    }

    #[test]
    fn test_parse_destroy_summary() {
        let output = "Destroy complete! Resources: 4 destroyed.\n";

        let summary = parse_destroy_summary(output).unwrap();
        assert_eq!(summary.destroyed, 4);
        assert_eq!(summary.added, 0);
    }

    #[test]
    fn test_parse_zero_destroyed() {
        // Destroying an already-destroyed stack is a no-op, not an error.
        let summary = parse_destroy_summary("Destroy complete! Resources: 0 destroyed.").unwrap();
        assert_eq!(summary.destroyed, 0);
    }

    #[test]
    fn test_no_summary_in_unrelated_output() {
        assert!(parse_apply_summary("Initializing the backend...").is_none());
        assert!(parse_destroy_summary("Error: apply failed").is_none());
    }
}
