//! The job contract
//!
//! A `Job` is the unit of work a worker repeats. Implementations live in
//! the `lbench-jobs` crate; the harness only talks to them through this
//! trait and never looks at their internals.

use async_trait::async_trait;

use crate::config::RunConfig;

// ============================================================================
// Job Trait
// ============================================================================

/// A repeatable unit of work with per-worker state
///
/// Each worker owns exactly one job instance for exactly one run. Session or
/// connection state is created in [`Job::init`] and released in
/// [`Job::finish`], which the worker calls even when earlier steps failed.
#[async_trait]
pub trait Job: Send {
    /// Job identifier (e.g., "noop", "connect")
    fn name(&self) -> &str;

    /// Prepare per-worker state before the start barrier
    async fn init(&mut self, worker_index: usize, config: &RunConfig) -> Result<(), JobError>;

    /// Perform one iteration
    ///
    /// `Ok(true)` is a success, `Ok(false)` a completed but unsuccessful
    /// iteration. `Err` means the iteration itself faulted and is reported
    /// separately from both.
    async fn request(&mut self) -> Result<bool, JobError>;

    /// Release per-worker state
    async fn finish(&mut self) -> Result<(), JobError>;

    /// Counters backing the provided tally methods
    fn tally(&self) -> &JobTally;

    /// Mutable access to the counters
    fn tally_mut(&mut self) -> &mut JobTally;

    /// Verbosity captured during `init`
    fn verbosity(&self) -> u8 {
        0
    }

    /// Record a successful iteration
    fn inc_success(&mut self) {
        self.tally_mut().success += 1;
    }

    /// Record an attempted iteration
    fn inc_count(&mut self) {
        self.tally_mut().count += 1;
    }

    /// Iterations attempted so far
    fn count(&self) -> usize {
        self.tally().count
    }

    /// Iterations that succeeded so far
    fn success(&self) -> usize {
        self.tally().success
    }
}

/// Per-job iteration counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobTally {
    /// Iterations attempted
    pub count: usize,
    /// Iterations that returned success
    pub success: usize,
}

/// Job-specific errors
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// Setup failed
    #[error("init failed: {0}")]
    Init(String),

    /// A single iteration faulted
    #[error("request failed: {0}")]
    Request(String),

    /// Teardown failed
    #[error("finish failed: {0}")]
    Finish(String),

    /// A job option could not be used
    #[error("invalid option {key}: {message}")]
    InvalidOption {
        /// Option name
        key: String,
        /// Why it was rejected
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Constructor for fresh job instances, one per worker
pub type JobFactory = std::sync::Arc<dyn Fn() -> Box<dyn Job> + Send + Sync>;
