//! lbench-core: building blocks for concurrent load generation
//!
//! This crate provides the pieces every lbench run is assembled from:
//!
//! - The `Job` contract a load generator implements
//! - Workers that drive one job instance for a fixed share of iterations
//! - The orchestrator: readiness barrier, start gate, result slots
//! - Aggregation of per-worker results into a run summary
//! - Report rendering
//! - Error handling

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod channel;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod report;
pub mod traits;
pub mod worker;

#[cfg(test)]
mod mock;

pub use channel::{ChannelConfig, StartGate, StartSignal, WorkerEvent};
pub use config::{ConfigError, JobParams, RunConfig};
pub use error::*;
pub use orchestrator::{
    Interruption, Orchestrator, OrchestratorBuilder, RunOutcome, RuntimeEnv, Summary, WorkerLine,
};
pub use report::{Report, ReportFormat};
pub use traits::*;
pub use worker::{Worker, WorkerBuilder, WorkerFault, WorkerResult};
