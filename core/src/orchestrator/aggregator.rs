//! Result aggregation from multiple workers

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{BenchError, BenchResult};
use crate::worker::{WorkerFault, WorkerResult};

/// Facts about the machine and runtime a run executed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuntimeEnv {
    /// Logical CPUs available to the process
    pub cpu_count: usize,
    /// Runtime worker threads configured for the run
    pub parallelism: usize,
}

impl RuntimeEnv {
    /// Detect the CPU count; `parallelism` is what the runtime was built with
    pub fn detect(parallelism: usize) -> Self {
        Self {
            cpu_count: num_cpus::get(),
            parallelism,
        }
    }
}

/// One worker's line in a verbose report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerLine {
    /// Worker index
    pub worker_index: usize,
    /// `count / elapsed`
    pub requests_per_second: f64,
    /// Elapsed seconds
    pub elapsed_secs: f64,
    /// Iterations attempted
    pub count: usize,
    /// Iterations that succeeded
    pub success: usize,
    /// Fault, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<WorkerFault>,
}

/// Run-level statistics
///
/// `Summary::from_results` is a pure function of its inputs: the same
/// results always produce the same summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Configured number of workers
    pub concurrency: usize,

    /// Sum of per-worker `count`
    pub total_requests: usize,

    /// Sum of per-worker `success`
    pub success_requests: usize,

    /// `success * 100 / total`, truncated
    pub success_rate_percent: usize,

    /// Earliest worker start
    pub first_time: DateTime<Utc>,

    /// Latest worker end
    pub last_time: DateTime<Utc>,

    /// Wall-clock span of the whole run in seconds
    pub taken_secs: f64,

    /// `total / taken`
    pub requests_per_second: f64,

    /// `concurrency * taken * 1000 / total`
    pub time_per_request_ms: f64,

    /// `taken * 1000 / total`
    pub time_per_request_across_all_ms: f64,

    /// Machine and runtime facts
    pub env: RuntimeEnv,

    /// Per-worker figures, ordered by worker index
    pub workers: Vec<WorkerLine>,

    /// Workers that reported a fault
    pub failed_workers: usize,
}

impl Summary {
    /// Aggregate per-worker results into run statistics
    ///
    /// # Errors
    ///
    /// `EmptyRun` when there are no results, no timed worker, or zero total
    /// requests; `ZeroDuration` when the measured span has no length.
    pub fn from_results(
        results: &[WorkerResult],
        concurrency: usize,
        env: RuntimeEnv,
    ) -> BenchResult<Self> {
        if results.is_empty() {
            return Err(BenchError::empty_run("no worker results to aggregate"));
        }

        let total_requests: usize = results.iter().map(|r| r.count).sum();
        let success_requests: usize = results.iter().map(|r| r.success).sum();
        if total_requests == 0 {
            return Err(BenchError::empty_run("total requests is 0"));
        }

        let first_time = results.iter().filter_map(|r| r.start_time).min();
        let last_time = results.iter().filter_map(|r| r.end_time).max();
        let (first_time, last_time) = match (first_time, last_time) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(BenchError::empty_run("no worker entered its timed section")),
        };

        let taken_secs = (last_time - first_time)
            .to_std()
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        if taken_secs <= 0.0 {
            return Err(BenchError::zero_duration());
        }

        let total = total_requests as f64;
        let workers = results
            .iter()
            .map(|r| WorkerLine {
                worker_index: r.worker_index,
                requests_per_second: r.requests_per_second(),
                elapsed_secs: r.elapsed_secs(),
                count: r.count,
                success: r.success,
                fault: r.fault.clone(),
            })
            .collect();

        Ok(Self {
            concurrency,
            total_requests,
            success_requests,
            success_rate_percent: success_requests * 100 / total_requests,
            first_time,
            last_time,
            taken_secs,
            requests_per_second: total / taken_secs,
            time_per_request_ms: concurrency as f64 * taken_secs * 1000.0 / total,
            time_per_request_across_all_ms: taken_secs * 1000.0 / total,
            env,
            workers,
            failed_workers: results.iter().filter(|r| !r.is_clean()).count(),
        })
    }
}
