//! Terraform invocation options.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use regex::Regex;

/// Known-transient failures and how many attempts they earn.
///
/// The default policy performs no retries; install the stock catalog with
/// [`Options::with_default_retryable_errors`] or add project-specific
/// patterns via [`RetryPolicy::retry_on`].
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first (1 = no retries)
    pub max_attempts: u32,
    /// Base delay, doubled after each failed attempt
    pub backoff_base: Duration,
    /// Output patterns that mark a failure as transient
    pub retryable: Vec<RetryablePattern>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            backoff_base: Duration::from_secs(1),
            retryable: Vec::new(),
        }
    }
}

/// Errors terraform and its providers are known to throw intermittently.
/// An operation that fails with one of these is worth retrying; anything
/// else is treated as a genuine configuration error.
const DEFAULT_RETRYABLE: &[(&str, &str)] = &[
    (
        "Failed to query available provider packages",
        "registry flake while resolving providers",
    ),
    (
        "timeout while waiting for plugin to start",
        "provider plugin slow to start",
    ),
    (
        "could not query provider registry",
        "registry service unreachable",
    ),
    ("registry service is unreachable", "registry outage"),
    ("Error installing provider", "provider download interrupted"),
    ("could not download module", "module download interrupted"),
    ("TLS handshake timeout", "network flake"),
    ("connection reset by peer", "network flake"),
    (
        "Client.Timeout exceeded while awaiting headers",
        "slow network to provider API",
    ),
    (
        "Error acquiring the state lock",
        "state lock held by a previous run",
    ),
];

impl RetryPolicy {
    /// The stock transient-error catalog: three attempts with exponential
    /// backoff over the patterns above.
    pub fn default_retryable() -> Self {
        let retryable = DEFAULT_RETRYABLE
            .iter()
            .map(|(pattern, reason)| {
                RetryablePattern::new(pattern, *reason).expect("stock pattern is valid")
            })
            .collect();

        Self {
            max_attempts: 3,
            backoff_base: Duration::from_secs(1),
            retryable,
        }
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    /// Add a pattern to retry on.
    pub fn retry_on(mut self, pattern: RetryablePattern) -> Self {
        self.retryable.push(pattern);
        self
    }

    /// Find the first retryable pattern matching the given output.
    pub fn matching(&self, output: &str) -> Option<&RetryablePattern> {
        self.retryable.iter().find(|p| p.pattern.is_match(output))
    }
}

/// One retryable-output pattern with the reason it is considered transient.
#[derive(Debug, Clone)]
pub struct RetryablePattern {
    pub pattern: Regex,
    pub reason: String,
}

impl RetryablePattern {
    pub fn new(pattern: &str, reason: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            reason: reason.into(),
        })
    }
}

/// Options for a terraform operation: which configuration directory to run
/// in, optionally restricted to named targets, plus variables, environment
/// and retry behavior. An empty target list means the whole configuration.
#[derive(Debug, Clone)]
pub struct Options {
    /// Directory containing the terraform configuration
    pub terraform_dir: PathBuf,
    /// Module/resource addresses to restrict the operation to
    pub targets: Vec<String>,
    /// Input variables, passed as `-var` flags
    pub vars: BTreeMap<String, serde_json::Value>,
    /// Variable files, passed as `-var-file` flags
    pub var_files: Vec<PathBuf>,
    /// Backend configuration, passed to init as `-backend-config` flags
    pub backend_config: BTreeMap<String, String>,
    /// Environment variables for the terraform process
    pub env: BTreeMap<String, String>,
    /// Disable colored output
    pub no_color: bool,
    /// Whether state locking is enabled
    pub lock: bool,
    /// Transient-error retry policy
    pub retry: RetryPolicy,
}

impl Options {
    pub fn new(terraform_dir: impl AsRef<Path>) -> Self {
        Self {
            terraform_dir: terraform_dir.as_ref().to_path_buf(),
            targets: Vec::new(),
            vars: BTreeMap::new(),
            var_files: Vec::new(),
            backend_config: BTreeMap::new(),
            env: BTreeMap::new(),
            no_color: true,
            lock: true,
            retry: RetryPolicy::default(),
        }
    }

    /// Restrict the operation to a module or resource address.
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.targets.push(target.into());
        self
    }

    pub fn targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets.extend(targets.into_iter().map(Into::into));
        self
    }

    pub fn var(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn var_file(mut self, path: impl AsRef<Path>) -> Self {
        self.var_files.push(path.as_ref().to_path_buf());
        self
    }

    pub fn backend_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.backend_config.insert(key.into(), value.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn color(mut self) -> Self {
        self.no_color = false;
        self
    }

    pub fn without_lock(mut self) -> Self {
        self.lock = false;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Install the stock transient-error retry catalog.
    pub fn with_default_retryable_errors(mut self) -> Self {
        self.retry = RetryPolicy::default_retryable();
        self
    }
}
