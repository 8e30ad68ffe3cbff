//! Built-in job variants for lbench
//!
//! This crate provides implementations of the `Job` trait for:
//!
//! - `noop`: every request succeeds immediately
//! - `sleep`: every request waits a fixed latency
//! - `connect`: every request opens a TCP connection to the target
//!
//! The set is closed: a run picks its job by name through [`registry`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod connect;
pub mod noop;
pub mod registry;
pub mod sleep;

pub use connect::ConnectJob;
pub use noop::NoopJob;
pub use registry::{lookup, names, JobKind, UnknownJob};
pub use sleep::SleepJob;

use lbench_core::{JobError, JobParams};

/// Parse a numeric job option, falling back to `default` when unset
pub(crate) fn parse_option(params: &JobParams, key: &str, default: u64) -> Result<u64, JobError> {
    match params.option(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| JobError::InvalidOption {
            key: key.to_string(),
            message: format!("expected a non-negative integer, got {raw:?}"),
        }),
    }
}
