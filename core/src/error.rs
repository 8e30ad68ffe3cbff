//! Error types for lbench-core

use std::fmt;

use thiserror::Error;

/// Classification of a [`BenchError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchErrorKind {
    /// A required builder part was never supplied
    MissingConfig,
    /// Run configuration failed validation
    Config,
    /// Barrier or worker coordination failed
    Orchestration,
    /// Aggregation found no requests (or no results) to report on
    EmptyRun,
    /// Aggregation found a measured window of zero length
    ZeroDuration,
}

impl fmt::Display for BenchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BenchErrorKind::MissingConfig => "missing configuration",
            BenchErrorKind::Config => "configuration error",
            BenchErrorKind::Orchestration => "orchestration error",
            BenchErrorKind::EmptyRun => "empty run",
            BenchErrorKind::ZeroDuration => "zero duration",
        };
        f.write_str(s)
    }
}

/// Core error type
#[derive(Error, Debug, Clone)]
#[error("{kind}: {message}")]
pub struct BenchError {
    /// What went wrong
    pub kind: BenchErrorKind,
    /// Human readable detail
    pub message: String,
}

impl BenchError {
    /// Create an error of the given kind
    pub fn new(kind: BenchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// A builder part named `what` was not set
    pub fn missing_config(what: &str) -> Self {
        Self::new(
            BenchErrorKind::MissingConfig,
            format!("{what} must be set before build"),
        )
    }

    /// Invalid configuration
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(BenchErrorKind::Config, message)
    }

    /// Coordination failure
    pub fn orchestration(message: impl Into<String>) -> Self {
        Self::new(BenchErrorKind::Orchestration, message)
    }

    /// Nothing to aggregate
    pub fn empty_run(message: impl Into<String>) -> Self {
        Self::new(BenchErrorKind::EmptyRun, message)
    }

    /// Measured window has no length
    pub fn zero_duration() -> Self {
        Self::new(
            BenchErrorKind::ZeroDuration,
            "measured window is zero seconds long, throughput is undefined",
        )
    }
}

/// Result type alias
pub type BenchResult<T> = std::result::Result<T, BenchError>;
