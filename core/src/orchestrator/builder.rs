//! Builder pattern for Orchestrator construction

use std::sync::Arc;
use std::time::Duration;

use crate::channel::ChannelConfig;
use crate::config::{JobParams, RunConfig};
use crate::error::{BenchError, BenchResult};
use crate::traits::{Job, JobFactory};

use super::executor::Orchestrator;

/// Builder for creating an Orchestrator with proper configuration
///
/// Validation happens in `build`, so a bad configuration is refused before
/// any worker exists.
///
/// # Example
///
/// ```ignore
/// let orchestrator = OrchestratorBuilder::new()
///     .concurrency(10)
///     .total_iterations(1000)
///     .job_factory(|| Box::new(NoopJob::default()))
///     .build()?;
/// ```
pub struct OrchestratorBuilder {
    config: RunConfig,
    job_factory: Option<JobFactory>,
    channel_config: ChannelConfig,
}

impl OrchestratorBuilder {
    /// Create a new orchestrator builder with default configuration
    pub fn new() -> Self {
        Self {
            config: RunConfig::default(),
            job_factory: None,
            channel_config: ChannelConfig::default(),
        }
    }

    /// Set the full run configuration
    pub fn config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the concurrency level
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency;
        self
    }

    /// Set the total iteration count
    pub fn total_iterations(mut self, total: usize) -> Self {
        self.config.total_iterations = total;
        self
    }

    /// Set the verbosity
    pub fn verbosity(mut self, verbosity: u8) -> Self {
        self.config.verbosity = verbosity;
        self
    }

    /// Set the runtime parallelism reported alongside results
    pub fn parallelism(mut self, parallelism: usize) -> Self {
        self.config.parallelism = parallelism;
        self
    }

    /// Set the run deadline
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the job parameters
    pub fn job_params(mut self, params: JobParams) -> Self {
        self.config.job = params;
        self
    }

    /// Set the job constructor, called once per worker
    pub fn job_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Job> + Send + Sync + 'static,
    {
        self.job_factory = Some(Arc::new(factory));
        self
    }

    /// Set an already shared job constructor
    pub fn shared_job_factory(mut self, factory: JobFactory) -> Self {
        self.job_factory = Some(factory);
        self
    }

    /// Set the channel configuration
    pub fn channel_config(mut self, config: ChannelConfig) -> Self {
        self.channel_config = config;
        self
    }

    /// Build the orchestrator
    ///
    /// # Errors
    ///
    /// Returns an error if the job factory is not set, or if configuration
    /// validation fails.
    pub fn build(self) -> BenchResult<Orchestrator> {
        let job_factory = self
            .job_factory
            .ok_or_else(|| BenchError::missing_config("job factory"))?;

        self.config
            .validate()
            .map_err(|e| BenchError::config(e.to_string()))?;

        Ok(Orchestrator::new(
            self.config,
            job_factory,
            self.channel_config,
        ))
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
