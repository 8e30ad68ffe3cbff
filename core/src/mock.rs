//! Configurable fake job shared by the worker and orchestrator tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::RunConfig;
use crate::traits::{Job, JobError, JobFactory, JobTally};

/// What `request` returns when it does not fault
#[derive(Debug, Clone, Copy)]
pub(crate) enum Outcome {
    AlwaysTrue,
    AlwaysFalse,
    /// true, false, true, ... per job instance
    Alternate,
}

#[derive(Debug, Clone)]
pub(crate) struct MockJob {
    tally: JobTally,
    verbosity: u8,
    outcome: Outcome,
    delay: Option<Duration>,
    init_delay: Option<Duration>,
    init_jitter: Option<Duration>,
    fail_init: bool,
    fail_request_at: Option<usize>,
    fail_finish: bool,
    panic_in_request: bool,
    hang_in_request: bool,
    calls: usize,
    finished: Arc<AtomicUsize>,
}

impl MockJob {
    pub(crate) fn new() -> Self {
        Self {
            tally: JobTally::default(),
            verbosity: 0,
            outcome: Outcome::AlwaysTrue,
            delay: None,
            init_delay: None,
            init_jitter: None,
            fail_init: false,
            fail_request_at: None,
            fail_finish: false,
            panic_in_request: false,
            hang_in_request: false,
            calls: 0,
            finished: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = outcome;
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn with_init_delay(mut self, delay: Duration) -> Self {
        self.init_delay = Some(delay);
        self
    }

    /// Random init sleep in `[0, max)`
    pub(crate) fn with_init_jitter(mut self, max: Duration) -> Self {
        self.init_jitter = Some(max);
        self
    }

    pub(crate) fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    pub(crate) fn failing_request_at(mut self, iteration: usize) -> Self {
        self.fail_request_at = Some(iteration);
        self
    }

    pub(crate) fn failing_finish(mut self) -> Self {
        self.fail_finish = true;
        self
    }

    pub(crate) fn panicking(mut self) -> Self {
        self.panic_in_request = true;
        self
    }

    pub(crate) fn hanging(mut self) -> Self {
        self.hang_in_request = true;
        self
    }

    /// Counter shared by every clone, bumped on each `finish`
    pub(crate) fn finish_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.finished)
    }

    /// Factory handing out fresh clones of this template
    pub(crate) fn factory(self) -> JobFactory {
        Arc::new(move || Box::new(self.clone()) as Box<dyn Job>)
    }
}

#[async_trait]
impl Job for MockJob {
    fn name(&self) -> &str {
        "mock"
    }

    async fn init(&mut self, _worker_index: usize, config: &RunConfig) -> Result<(), JobError> {
        self.verbosity = config.verbosity;
        if let Some(delay) = self.init_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(max) = self.init_jitter {
            let jitter = rand::random::<f64>() * max.as_secs_f64();
            tokio::time::sleep(Duration::from_secs_f64(jitter)).await;
        }
        if self.fail_init {
            return Err(JobError::Init("simulated init failure".into()));
        }
        Ok(())
    }

    async fn request(&mut self) -> Result<bool, JobError> {
        let call = self.calls;
        self.calls += 1;

        if self.panic_in_request {
            panic!("simulated panic in request");
        }
        if self.hang_in_request {
            std::future::pending::<()>().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_request_at == Some(call) {
            return Err(JobError::Request("simulated request failure".into()));
        }

        Ok(match self.outcome {
            Outcome::AlwaysTrue => true,
            Outcome::AlwaysFalse => false,
            Outcome::Alternate => call % 2 == 0,
        })
    }

    async fn finish(&mut self) -> Result<(), JobError> {
        self.finished.fetch_add(1, Ordering::SeqCst);
        if self.fail_finish {
            return Err(JobError::Finish("simulated finish failure".into()));
        }
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
