//! Worker lifecycle: init -> ready -> wait -> timed loop -> finish -> report

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;

use crate::channel::{StartSignal, WorkerEvent};
use crate::config::RunConfig;
use crate::error::{BenchError, BenchResult};
use crate::traits::Job;

use super::result::{WorkerFault, WorkerResult};

/// Worker drives one job instance through one run
///
/// Workers are tokio tasks spawned by the Orchestrator. Each owns its job
/// outright; the only things shared with other workers are the event
/// channel and the start gate.
pub struct Worker {
    /// 0-based worker index
    index: usize,

    /// Run configuration (shared, read-only)
    config: Arc<RunConfig>,

    /// The job this worker exercises
    job: Box<dyn Job>,

    /// Events to the orchestrator
    events: mpsc::Sender<WorkerEvent>,

    /// Start gate handle
    start: StartSignal,
}

impl Worker {
    /// Create a new worker
    ///
    /// Use `WorkerBuilder` for a more ergonomic construction.
    pub fn new(
        index: usize,
        config: Arc<RunConfig>,
        job: Box<dyn Job>,
        events: mpsc::Sender<WorkerEvent>,
        start: StartSignal,
    ) -> Self {
        Self {
            index,
            config,
            job,
            events,
            start,
        }
    }

    /// Run the worker to completion
    ///
    /// Sends `Ready` once setup is done, waits for the start gate, runs its
    /// share of iterations and sends `Finished` exactly once. Job faults are
    /// reported inside the result; an `Err` here means the orchestrator went
    /// away and nobody is listening anymore.
    pub async fn run(mut self) -> BenchResult<()> {
        let iterations = self.config.per_worker_iterations();
        let mut result = WorkerResult::new(self.index);

        let init = self.job.init(self.index, &self.config).await;
        self.send(WorkerEvent::Ready {
            worker_index: self.index,
        })
        .await?;

        match init {
            Ok(()) => {
                if !self.start.wait().await {
                    self.finish(&mut result).await;
                    return Err(BenchError::orchestration(format!(
                        "worker {}: start gate closed before release",
                        self.index
                    )));
                }
                self.timed_loop(iterations, &mut result).await;
            }
            Err(e) => {
                tracing::warn!(worker_id = self.index, error = %e, "Job init failed");
                result.record_fault(WorkerFault::Init(e.to_string()));
            }
        }

        self.finish(&mut result).await;
        result.count = self.job.count();
        result.success = self.job.success();

        tracing::debug!(
            worker_id = self.index,
            count = result.count,
            success = result.success,
            elapsed_ms = result.elapsed.as_millis() as u64,
            fault = ?result.fault,
            "Worker finished"
        );

        self.send(WorkerEvent::Finished(result)).await
    }

    /// Run the worker, converting a panic into a `Crashed` event
    ///
    /// This is what the orchestrator spawns: whatever the job does, the
    /// orchestrator hears back from this worker.
    ///
    /// A panic unwinds through the job, so its counters are lost and
    /// `finish` is never called. The orchestrator records the slot as
    /// `Panicked` with `count = success = 0` and no timestamps.
    pub async fn run_guarded(self) {
        let index = self.index;
        let events = self.events.clone();

        match AssertUnwindSafe(self.run()).catch_unwind().await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::debug!(worker_id = index, error = %e, "Worker stopped early");
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(worker_id = index, panic = %message, "Worker task panicked");
                let _ = events
                    .send(WorkerEvent::Crashed {
                        worker_index: index,
                        message,
                    })
                    .await;
            }
        }
    }

    async fn timed_loop(&mut self, iterations: usize, result: &mut WorkerResult) {
        if self.job.verbosity() >= 2 {
            tracing::info!(worker_id = self.index, "worker[{}]: starting job", self.index);
        }

        result.start();
        for iteration in 0..iterations {
            match self.job.request().await {
                Ok(true) => self.job.inc_success(),
                Ok(false) => {}
                Err(e) => {
                    self.job.inc_count();
                    tracing::warn!(
                        worker_id = self.index,
                        iteration,
                        error = %e,
                        "Request failed, stopping worker"
                    );
                    result.record_fault(WorkerFault::Request {
                        iteration,
                        message: e.to_string(),
                    });
                    break;
                }
            }
            self.job.inc_count();
        }
        result.stop();
    }

    async fn finish(&mut self, result: &mut WorkerResult) {
        if let Err(e) = self.job.finish().await {
            tracing::warn!(worker_id = self.index, error = %e, "Job finish failed");
            result.record_fault(WorkerFault::Finish(e.to_string()));
        }
    }

    async fn send(&mut self, event: WorkerEvent) -> BenchResult<()> {
        self.events.send(event).await.map_err(|_| {
            BenchError::orchestration(format!("worker {}: event channel closed", self.index))
        })
    }

    /// Get the worker index
    pub fn index(&self) -> usize {
        self.index
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("index", &self.index)
            .field("job", &self.job.name())
            .field("iterations", &self.config.per_worker_iterations())
            .finish()
    }
}
