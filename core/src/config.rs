//! Run configuration types

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default bind DN handed to jobs
pub const DEFAULT_BIND_DN: &str = "cn=Manager,dc=example,dc=com";
/// Default bind secret handed to jobs
pub const DEFAULT_SECRET: &str = "secret";
/// Default base DN handed to jobs
pub const DEFAULT_BASE_DN: &str = "dc=example,dc=com";
/// Longest accepted run deadline (one year)
pub const MAX_TIMEOUT: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Run configuration
///
/// Defines how a benchmark run is driven: how many workers, how many
/// iterations in total, and what the job needs to set itself up. A run
/// config is read-only once the orchestrator has been built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of parallel workers
    pub concurrency: usize,

    /// Total iterations requested across all workers
    pub total_iterations: usize,

    /// Troubleshooting verbosity (0 = quiet)
    pub verbosity: u8,

    /// Runtime worker threads the run executes on
    pub parallelism: usize,

    /// Optional deadline covering both barriers. `None` waits forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,

    /// Job specific parameters, forwarded opaquely to `Job::init`
    #[serde(default)]
    pub job: JobParams,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            total_iterations: 1,
            verbosity: 0,
            parallelism: num_cpus::get(),
            timeout: None,
            job: JobParams::default(),
        }
    }
}

impl RunConfig {
    /// Create a new config with the given concurrency and iteration total
    pub fn new(concurrency: usize, total_iterations: usize) -> Self {
        Self {
            concurrency,
            total_iterations,
            ..Default::default()
        }
    }

    /// Set the verbosity
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set the runtime parallelism
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Set the run deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the job parameters
    pub fn with_job(mut self, job: JobParams) -> Self {
        self.job = job;
        self
    }

    /// Iterations each worker performs: `ceil(total_iterations / concurrency)`.
    ///
    /// Every worker gets the same share, so the sum over all workers may
    /// exceed `total_iterations` by up to `concurrency - 1`.
    pub fn per_worker_iterations(&self) -> usize {
        if self.concurrency == 0 {
            return 0;
        }
        self.total_iterations.div_ceil(self.concurrency)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency(
                "concurrency must be at least 1".into(),
            ));
        }

        if self.total_iterations == 0 {
            return Err(ConfigError::InvalidIterations(
                "total iterations must be at least 1".into(),
            ));
        }

        if self.parallelism == 0 {
            return Err(ConfigError::InvalidParallelism(
                "parallelism must be at least 1".into(),
            ));
        }

        if let Some(timeout) = self.timeout {
            if timeout.is_zero() {
                return Err(ConfigError::InvalidTimeout(
                    "timeout must be longer than zero".into(),
                ));
            }
            if timeout > MAX_TIMEOUT {
                return Err(ConfigError::InvalidTimeout(format!(
                    "timeout must not exceed {} seconds",
                    MAX_TIMEOUT.as_secs()
                )));
            }
        }

        Ok(())
    }
}

/// Job specific parameters
///
/// The harness never reads these; they are handed to every job's `init`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobParams {
    /// What the job is aimed at (address, URI, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Bind DN
    pub bind_dn: String,

    /// Bind secret
    #[serde(default, skip_serializing)]
    pub secret: String,

    /// Base DN
    pub base_dn: String,

    /// Free-form `key=value` options
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

impl Default for JobParams {
    fn default() -> Self {
        Self {
            target: None,
            bind_dn: DEFAULT_BIND_DN.to_string(),
            secret: DEFAULT_SECRET.to_string(),
            base_dn: DEFAULT_BASE_DN.to_string(),
            options: BTreeMap::new(),
        }
    }
}

impl JobParams {
    /// Set the target
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Add a job option
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Look up a job option
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid concurrency value
    #[error("Invalid concurrency: {0}")]
    InvalidConcurrency(String),

    /// Invalid iteration total
    #[error("Invalid iteration count: {0}")]
    InvalidIterations(String),

    /// Invalid runtime parallelism
    #[error("Invalid parallelism: {0}")]
    InvalidParallelism(String),

    /// Invalid timeout
    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),
}
