//! Orchestrator for run lifecycle management
//!
//! The Orchestrator coordinates one benchmark run:
//! - Spawning one worker task per concurrency slot, each with its own job
//! - A readiness barrier: nobody starts timing until everyone is set up
//! - A single release through the start gate
//! - A result barrier that slots each result by worker index
//! - Optional deadline and Ctrl+C cancellation
//!
//! # Example
//!
//! ```ignore
//! use lbench_core::{OrchestratorBuilder, Summary, RuntimeEnv};
//!
//! let orchestrator = OrchestratorBuilder::new()
//!     .concurrency(4)
//!     .total_iterations(1000)
//!     .job_factory(|| Box::new(NoopJob::default()))
//!     .build()?;
//!
//! let outcome = orchestrator.run_with_signal_handling().await?;
//! let summary = Summary::from_results(&outcome.results, 4, RuntimeEnv::detect(4))?;
//! ```

mod aggregator;
mod builder;
mod executor;

pub use aggregator::{RuntimeEnv, Summary, WorkerLine};
pub use builder::OrchestratorBuilder;
pub use executor::{Interruption, Orchestrator, RunOutcome};
