//! Orchestrator execution logic

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::channel::{ChannelConfig, StartGate, WorkerEvent};
use crate::config::RunConfig;
use crate::error::{BenchError, BenchResult};
use crate::traits::JobFactory;
use crate::worker::{WorkerBuilder, WorkerFault, WorkerResult};

/// Orchestrator manages the run lifecycle
///
/// Spawns one worker per concurrency slot, holds them at a readiness
/// barrier until every worker has finished setup, releases them together,
/// then collects one result per worker into a slot indexed by worker.
pub struct Orchestrator {
    /// Run configuration, shared read-only with every worker
    pub(crate) config: Arc<RunConfig>,

    /// Produces a fresh job for each worker
    pub(crate) job_factory: JobFactory,

    /// Event channel sizing
    pub(crate) channel_config: ChannelConfig,

    /// Cancellation signal sender
    pub(crate) shutdown_tx: broadcast::Sender<()>,
}

/// Why a run stopped before every worker reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interruption {
    /// The configured timeout expired
    TimedOut,
    /// Shutdown was requested
    Cancelled,
}

impl Interruption {
    fn fault(self) -> WorkerFault {
        match self {
            Interruption::TimedOut => WorkerFault::TimedOut,
            Interruption::Cancelled => WorkerFault::Cancelled,
        }
    }
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// `results[i]` is worker `i`'s result, whatever order they finished in
    pub results: Vec<WorkerResult>,

    /// Set when the run was cut short
    pub interrupted: Option<Interruption>,
}

impl RunOutcome {
    /// Number of workers that reported a fault
    pub fn failures(&self) -> usize {
        self.results.iter().filter(|r| !r.is_clean()).count()
    }
}

impl Orchestrator {
    /// Create a new orchestrator
    ///
    /// Use `OrchestratorBuilder` for a more ergonomic construction; it also
    /// validates the configuration.
    pub fn new(config: RunConfig, job_factory: JobFactory, channel_config: ChannelConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config: Arc::new(config),
            job_factory,
            channel_config,
            shutdown_tx,
        }
    }

    /// Get a shutdown signal receiver
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Cancel a running `run`
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Get the run configuration
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run the benchmark
    ///
    /// Returns one result per worker, ordered by worker index. Worker faults
    /// are carried in the results; an error is returned only when no worker
    /// managed a single iteration.
    pub async fn run(&self) -> BenchResult<RunOutcome> {
        let concurrency = self.config.concurrency;
        let (events_tx, mut events_rx) = mpsc::channel(self.channel_config.event_buffer());
        let (gate, signal) = StartGate::new();
        let mut shutdown = self.shutdown_tx.subscribe();
        let mut tasks = JoinSet::new();

        tracing::info!(
            concurrency,
            total_iterations = self.config.total_iterations,
            per_worker = self.config.per_worker_iterations(),
            timeout = ?self.config.timeout,
            "Starting run"
        );

        for worker_index in 0..concurrency {
            let worker = WorkerBuilder::new(worker_index)
                .config(Arc::clone(&self.config))
                .job((self.job_factory)())
                .events(events_tx.clone())
                .start_signal(signal.clone())
                .build()?;
            tasks.spawn(worker.run_guarded());
        }
        // Only workers hold senders now; a closed channel means all are gone.
        drop(events_tx);
        drop(signal);

        // A deadline past what `Instant` can represent is no deadline at all
        let deadline = self
            .config
            .timeout
            .and_then(|t| Instant::now().checked_add(t));
        let mut slots = Slots::new(concurrency);

        let mut interrupted = slots
            .collect(&mut events_rx, &mut shutdown, deadline, Slots::all_ready)
            .await
            .err();

        if interrupted.is_none() {
            tracing::debug!(concurrency, "All workers ready, releasing");
            gate.open();
            interrupted = slots
                .collect(&mut events_rx, &mut shutdown, deadline, Slots::all_reported)
                .await
                .err();
        }

        if let Some(reason) = interrupted {
            tracing::warn!(
                reason = ?reason,
                reported = slots.reported(),
                concurrency,
                "Run interrupted, aborting remaining workers"
            );
            tasks.abort_all();
            slots.fill_missing(reason.fault());
        }
        while tasks.join_next().await.is_some() {}

        let results = slots.into_results();
        let outcome = RunOutcome {
            results,
            interrupted,
        };

        let failures = outcome.failures();
        let attempted: usize = outcome.results.iter().map(|r| r.count).sum();
        if failures == concurrency && attempted == 0 {
            let first = outcome
                .results
                .iter()
                .find_map(|r| r.fault.as_ref())
                .map(ToString::to_string)
                .unwrap_or_default();
            return Err(BenchError::orchestration(format!(
                "All {} workers failed ({})",
                concurrency, first
            )));
        }

        tracing::info!(
            workers = concurrency,
            failures,
            attempted,
            "Run completed"
        );

        Ok(outcome)
    }

    /// Run with Ctrl+C signal handling
    ///
    /// Ctrl+C cancels the run; workers that have not reported are marked
    /// `Cancelled`.
    pub async fn run_with_signal_handling(&self) -> BenchResult<RunOutcome> {
        let shutdown_tx = self.shutdown_tx.clone();

        let signal_handle = tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Received Ctrl+C, cancelling run...");
                    let _ = shutdown_tx.send(());
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                }
            }
        });

        let result = self.run().await;
        signal_handle.abort();

        result
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("channel_config", &self.channel_config)
            .finish()
    }
}

/// Barrier bookkeeping: who has arrived, who has reported
struct Slots {
    ready: Vec<bool>,
    results: Vec<Option<WorkerResult>>,
}

impl Slots {
    fn new(concurrency: usize) -> Self {
        Self {
            ready: vec![false; concurrency],
            results: vec![None; concurrency],
        }
    }

    fn all_ready(&self) -> bool {
        self.ready.iter().all(|r| *r)
    }

    fn all_reported(&self) -> bool {
        self.results.iter().all(Option::is_some)
    }

    fn reported(&self) -> usize {
        self.results.iter().filter(|r| r.is_some()).count()
    }

    /// Pump events until `done` holds, the deadline passes or shutdown fires
    async fn collect(
        &mut self,
        events: &mut mpsc::Receiver<WorkerEvent>,
        shutdown: &mut broadcast::Receiver<()>,
        deadline: Option<Instant>,
        done: fn(&Self) -> bool,
    ) -> Result<(), Interruption> {
        let expired = async {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(expired);

        while !done(self) {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.on_event(event),
                    None => self.fill_missing(WorkerFault::Lost),
                },
                _ = shutdown.recv() => return Err(Interruption::Cancelled),
                _ = &mut expired => return Err(Interruption::TimedOut),
            }
        }
        Ok(())
    }

    fn on_event(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::Ready { worker_index } => {
                if let Some(ready) = self.ready.get_mut(worker_index) {
                    *ready = true;
                }
                tracing::trace!(worker_id = worker_index, "Worker ready");
            }
            WorkerEvent::Finished(result) => {
                let index = result.worker_index;
                if let Some(fault) = &result.fault {
                    tracing::warn!(worker_id = index, fault = %fault, "Worker reported a fault");
                }
                self.place(index, result);
            }
            WorkerEvent::Crashed {
                worker_index,
                message,
            } => {
                self.place(
                    worker_index,
                    WorkerResult::faulted(worker_index, WorkerFault::Panicked(message)),
                );
            }
        }
    }

    /// Store a final result in its worker's slot. A final result also
    /// counts as arrival.
    fn place(&mut self, index: usize, result: WorkerResult) {
        match self.results.get_mut(index) {
            Some(slot) if slot.is_none() => {
                *slot = Some(result);
                self.ready[index] = true;
            }
            Some(_) => tracing::warn!(worker_id = index, "Duplicate result ignored"),
            None => tracing::warn!(worker_id = index, "Result for unknown worker ignored"),
        }
    }

    /// Slots filled here never heard from their job: zero counts, no
    /// timestamps, and the aborted job's `finish` does not run.
    fn fill_missing(&mut self, fault: WorkerFault) {
        for (index, slot) in self.results.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(WorkerResult::faulted(index, fault.clone()));
            }
            self.ready[index] = true;
        }
    }

    fn into_results(self) -> Vec<WorkerResult> {
        self.results
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| WorkerResult::faulted(index, WorkerFault::Lost))
            })
            .collect()
    }
}
