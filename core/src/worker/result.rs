//! Per-worker run result

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Final record of one worker's run
///
/// Produced by exactly one worker and handed to the orchestrator once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerResult {
    /// 0-based worker index, unique within a run
    pub worker_index: usize,

    /// When the timed section began (`None` if it never began)
    pub start_time: Option<DateTime<Utc>>,

    /// When the timed section ended
    pub end_time: Option<DateTime<Utc>>,

    /// `end_time - start_time`
    pub elapsed: Duration,

    /// Iterations attempted
    pub count: usize,

    /// Iterations that returned success
    pub success: usize,

    /// Set when the worker did not complete cleanly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault: Option<WorkerFault>,
}

impl WorkerResult {
    /// Empty result for `worker_index`
    pub fn new(worker_index: usize) -> Self {
        Self {
            worker_index,
            start_time: None,
            end_time: None,
            elapsed: Duration::ZERO,
            count: 0,
            success: 0,
            fault: None,
        }
    }

    /// Result standing in for a worker that never reported
    pub fn faulted(worker_index: usize, fault: WorkerFault) -> Self {
        Self {
            fault: Some(fault),
            ..Self::new(worker_index)
        }
    }

    /// Mark the beginning of the timed section
    pub fn start(&mut self) {
        self.start_time = Some(Utc::now());
    }

    /// Mark the end of the timed section and compute `elapsed`
    pub fn stop(&mut self) {
        let end = Utc::now();
        self.end_time = Some(end);
        self.elapsed = self
            .start_time
            .and_then(|start| (end - start).to_std().ok())
            .unwrap_or(Duration::ZERO);
    }

    /// Elapsed time in seconds
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Individual throughput (`count / elapsed`), 0 when nothing was timed
    pub fn requests_per_second(&self) -> f64 {
        let secs = self.elapsed_secs();
        if secs > 0.0 {
            self.count as f64 / secs
        } else {
            0.0
        }
    }

    /// Whether the worker completed without a fault
    pub fn is_clean(&self) -> bool {
        self.fault.is_none()
    }

    /// Record a fault unless an earlier one is already recorded
    pub fn record_fault(&mut self, fault: WorkerFault) {
        if self.fault.is_none() {
            self.fault = Some(fault);
        }
    }
}

/// Why a worker did not complete cleanly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum WorkerFault {
    /// `Job::init` failed; the worker never ran
    #[error("init failed: {0}")]
    Init(String),

    /// `Job::request` faulted and the loop stopped
    #[error("request {iteration} failed: {message}")]
    Request {
        /// 0-based iteration that faulted
        iteration: usize,
        /// Error text
        message: String,
    },

    /// `Job::finish` failed
    #[error("finish failed: {0}")]
    Finish(String),

    /// The worker task panicked
    #[error("worker panicked: {0}")]
    Panicked(String),

    /// The run deadline expired before the worker reported
    #[error("timed out before reporting")]
    TimedOut,

    /// The run was cancelled (Ctrl+C) before the worker reported
    #[error("cancelled before reporting")]
    Cancelled,

    /// The worker ended without reporting a result
    #[error("worker ended without a result")]
    Lost,
}
