//! Job with a fixed, configurable latency
//!
//! Options:
//! - `latency_ms` (default 10): how long each request takes
//! - `fail_every` (default 0, off): every n-th request reports `false`

use std::time::Duration;

use async_trait::async_trait;
use lbench_core::{Job, JobError, JobTally, RunConfig};

use crate::parse_option;

const DEFAULT_LATENCY_MS: u64 = 10;

/// Each request sleeps for the configured latency
#[derive(Debug, Default)]
pub struct SleepJob {
    tally: JobTally,
    verbosity: u8,
    latency: Duration,
    fail_every: u64,
    calls: u64,
}

impl SleepJob {
    /// Configured per-request latency
    pub fn latency(&self) -> Duration {
        self.latency
    }
}

#[async_trait]
impl Job for SleepJob {
    fn name(&self) -> &str {
        "sleep"
    }

    async fn init(&mut self, worker_index: usize, config: &RunConfig) -> Result<(), JobError> {
        self.verbosity = config.verbosity;
        self.latency = Duration::from_millis(parse_option(
            &config.job,
            "latency_ms",
            DEFAULT_LATENCY_MS,
        )?);
        self.fail_every = parse_option(&config.job, "fail_every", 0)?;

        tracing::debug!(
            worker_id = worker_index,
            latency_ms = self.latency.as_millis() as u64,
            fail_every = self.fail_every,
            "Sleep job ready"
        );
        Ok(())
    }

    async fn request(&mut self) -> Result<bool, JobError> {
        self.calls += 1;
        tokio::time::sleep(self.latency).await;

        Ok(self.fail_every == 0 || self.calls % self.fail_every != 0)
    }

    async fn finish(&mut self) -> Result<(), JobError> {
        Ok(())
    }

    fn tally(&self) -> &JobTally {
        &self.tally
    }

    fn tally_mut(&mut self) -> &mut JobTally {
        &mut self.tally
    }

    fn verbosity(&self) -> u8 {
        self.verbosity
    }
}
