//! Job that does nothing and always succeeds
//!
//! Measures the harness itself: the figures it produces are an upper bound
//! on what any other job can reach on the same machine.

use async_trait::async_trait;
use lbench_core::{Job, JobError, JobTally, RunConfig};

/// Every request succeeds immediately
#[derive(Debug, Default)]
pub struct NoopJob {
    tally: JobTally,
    verbosity: u8,
}

#[async_trait]
impl Job for NoopJob {
    fn name(&self) -> &str {
        "noop"
    }

    async fn init(&mut self, _worker_index: usize, config: &RunConfig) -> Result<(), JobError> {
        self.verbosity = config.verbosity;
        Ok(())
    }

    async fn request(&mut self) -> Result<bool, JobError> {
        Ok(true)
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
