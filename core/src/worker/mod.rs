//! Worker module for executing a job's share of iterations
//!
//! A Worker is one tokio task bound to one job instance. Its lifecycle is
//! fixed:
//!
//! 1. Compute its share: `ceil(total_iterations / concurrency)`
//! 2. `Job::init` with its index and the run config
//! 3. Send `Ready` and park on the start gate
//! 4. On release, time `share` calls to `Job::request`, counting successes
//! 5. `Job::finish`, always
//! 6. Send its `WorkerResult` exactly once
//!
//! Job faults never escape as panics or dropped messages: they are recorded
//! on the result as a [`WorkerFault`] so the orchestrator can still close
//! both barriers.
//!
//! # Example
//!
//! ```ignore
//! use lbench_core::worker::WorkerBuilder;
//!
//! let worker = WorkerBuilder::new(0)
//!     .config(config)
//!     .job(job)
//!     .events(tx)
//!     .start_signal(gate.signal())
//!     .build()?;
//!
//! tokio::spawn(worker.run());
//! ```

mod builder;
mod executor;
mod result;

pub use builder::WorkerBuilder;
pub use executor::Worker;
pub use result::{WorkerFault, WorkerResult};

#[cfg(test)]
mod tests;
