//! Builder pattern for Worker construction

use crate::channel::{StartSignal, WorkerEvent};
use crate::config::RunConfig;
use crate::error::{BenchError, BenchResult};
use crate::traits::Job;

use super::executor::Worker;

use std::sync::Arc;
use tokio::sync::mpsc;

/// Builder for creating Worker instances
///
/// # Example
/// ```ignore
/// let worker = WorkerBuilder::new(0)
///     .config(config)
///     .job(job)
///     .events(tx)
///     .start_signal(signal)
///     .build()?;
/// ```
pub struct WorkerBuilder {
    index: usize,
    config: Option<Arc<RunConfig>>,
    job: Option<Box<dyn Job>>,
    events: Option<mpsc::Sender<WorkerEvent>>,
    start: Option<StartSignal>,
}

impl WorkerBuilder {
    /// Create a new builder with the given worker index
    pub fn new(index: usize) -> Self {
        Self {
            index,
            config: None,
            job: None,
            events: None,
            start: None,
        }
    }

    /// Set the run configuration
    pub fn config(mut self, config: Arc<RunConfig>) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the job instance (must not be shared with another worker)
    pub fn job(mut self, job: Box<dyn Job>) -> Self {
        self.job = Some(job);
        self
    }

    /// Set the event channel sender
    pub fn events(mut self, tx: mpsc::Sender<WorkerEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Set the start gate handle
    pub fn start_signal(mut self, signal: StartSignal) -> Self {
        self.start = Some(signal);
        self
    }

    /// Build the Worker
    ///
    /// # Errors
    /// Returns an error if any required field is missing or the worker
    /// index is out of range for the configured concurrency.
    pub fn build(self) -> BenchResult<Worker> {
        let config = self.config.ok_or(BenchError::missing_config("config"))?;
        let job = self.job.ok_or(BenchError::missing_config("job"))?;
        let events = self.events.ok_or(BenchError::missing_config("events"))?;
        let start = self
            .start
            .ok_or(BenchError::missing_config("start_signal"))?;

        if self.index >= config.concurrency {
            return Err(BenchError::config(format!(
                "worker index {} out of range for concurrency {}",
                self.index, config.concurrency
            )));
        }

        Ok(Worker::new(self.index, config, job, events, start))
    }
}
