//! Name to constructor mapping, resolved once at startup

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use lbench_core::{Job, JobFactory};

use crate::{ConnectJob, NoopJob, SleepJob};

/// Every job lbench knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    /// See [`NoopJob`]
    Noop,
    /// See [`SleepJob`]
    Sleep,
    /// See [`ConnectJob`]
    Connect,
}

impl JobKind {
    /// All variants, in the order they are listed to users
    pub const ALL: [JobKind; 3] = [JobKind::Noop, JobKind::Sleep, JobKind::Connect];

    /// Command name
    pub fn name(self) -> &'static str {
        match self {
            JobKind::Noop => "noop",
            JobKind::Sleep => "sleep",
            JobKind::Connect => "connect",
        }
    }

    /// Whether the job needs a target to do anything
    pub fn needs_target(self) -> bool {
        matches!(self, JobKind::Connect)
    }

    /// Constructor producing a fresh job per worker
    pub fn factory(self) -> JobFactory {
        match self {
            JobKind::Noop => Arc::new(|| Box::new(NoopJob::default()) as Box<dyn Job>),
            JobKind::Sleep => Arc::new(|| Box::new(SleepJob::default()) as Box<dyn Job>),
            JobKind::Connect => Arc::new(|| Box::new(ConnectJob::default()) as Box<dyn Job>),
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A job name outside the registry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown job {0:?} (available: {available})", available = names().join(", "))]
pub struct UnknownJob(pub String);

impl FromStr for JobKind {
    type Err = UnknownJob;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownJob(s.to_string()))
    }
}

/// Look up a job constructor by command name
pub fn lookup(name: &str) -> Option<JobFactory> {
    name.parse::<JobKind>().ok().map(JobKind::factory)
}

/// Registered command names
pub fn names() -> Vec<&'static str> {
    JobKind::ALL.iter().map(|kind| kind.name()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_names() {
        for name in ["noop", "sleep", "connect"] {
            let factory = lookup(name).expect("registered job");
            assert_eq!(factory().name(), name);
        }
    }

    #[test]
    fn test_lookup_is_closed() {
        assert!(lookup("ldapsearch").is_none());
        assert!(lookup("").is_none());
        assert!(lookup("NOOP").is_none());
    }

    #[test]
    fn test_unknown_job_lists_available() {
        let err = "bind".parse::<JobKind>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown job \"bind\" (available: noop, sleep, connect)"
        );
    }

    #[test]
    fn test_factory_yields_independent_instances() {
        let factory = JobKind::Noop.factory();
        let mut a = factory();
        let b = factory();
        a.inc_count();
        assert_eq!(a.count(), 1);
        assert_eq!(b.count(), 0);
    }

    #[test]
    fn test_only_connect_needs_target() {
        assert!(JobKind::Connect.needs_target());
        assert!(!JobKind::Noop.needs_target());
        assert!(!JobKind::Sleep.needs_target());
    }
}
