//! Job that opens a TCP connection per request
//!
//! The target is resolved once during `init`; every request then connects
//! to the resolved address and drops the stream straight away. A refused or
//! timed-out connection is an unsuccessful request, not a fault.
//!
//! Options:
//! - `connect_timeout_ms` (default 1000)

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use lbench_core::{Job, JobError, JobTally, RunConfig};
use tokio::net::{lookup_host, TcpStream};

use crate::parse_option;

const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 1000;

/// Each request is one TCP connect to the target
#[derive(Debug, Default)]
pub struct ConnectJob {
    tally: JobTally,
    verbosity: u8,
    worker_index: usize,
    addr: Option<SocketAddr>,
    connect_timeout: Duration,
}

impl ConnectJob {
    /// Address resolved during `init`
    pub fn addr(&self) -> Option<SocketAddr> {
        self.addr
    }
}

#[async_trait]
impl Job for ConnectJob {
    fn name(&self) -> &str {
        "connect"
    }

    async fn init(&mut self, worker_index: usize, config: &RunConfig) -> Result<(), JobError> {
        self.verbosity = config.verbosity;
        self.worker_index = worker_index;
        self.connect_timeout = Duration::from_millis(parse_option(
            &config.job,
            "connect_timeout_ms",
            DEFAULT_CONNECT_TIMEOUT_MS,
        )?);

        let target = config
            .job
            .target
            .as_deref()
            .ok_or_else(|| JobError::Init("connect needs a host:port target".into()))?;

        let addr = lookup_host(target)
            .await
            .map_err(|e| JobError::Init(format!("cannot resolve {target:?}: {e}")))?
            .next()
            .ok_or_else(|| JobError::Init(format!("{target:?} resolved to no address")))?;

        tracing::debug!(worker_id = worker_index, %addr, "Connect job ready");
        self.addr = Some(addr);
        Ok(())
    }

    async fn request(&mut self) -> Result<bool, JobError> {
        let addr = self
            .addr
            .ok_or_else(|| JobError::Request("request before init".into()))?;

        match tokio::time::timeout(self.connect_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(_stream)) => Ok(true),
            Ok(Err(e)) => {
                if self.verbosity >= 3 {
                    tracing::trace!(worker_id = self.worker_index, error = %e, "Connect failed");
                }
                Ok(false)
            }
            Err(_) => {
                if self.verbosity >= 3 {
                    tracing::trace!(worker_id = self.worker_index, "Connect timed out");
                }
                Ok(false)
            }
        }
    }

    async fn finish(&mut self) -> Result<(), JobError> {
        self.addr = None;
        Ok(())
    }

    fn tally(&self) -> &JobTally {
        &self.tally
    }

    fn tally_mut(&mut self) -> &mut JobTally {
        &mut self.tally
    }

    fn verbosity(&self) -> u8 {
        self.verbosity
    }
}
