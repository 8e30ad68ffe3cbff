//! Signalling between the orchestrator and its workers
//!
//! Workers talk to the orchestrator over one bounded `mpsc` channel of
//! [`WorkerEvent`]s. The orchestrator releases every worker at once through a
//! [`StartGate`], a one-shot latch built on `tokio::sync::watch`: once opened
//! it stays open, so a worker that subscribes or polls late still sees the
//! release.

use tokio::sync::watch;

use crate::worker::WorkerResult;

/// Message from a worker to the orchestrator
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    /// The worker finished setup and is parked at the start gate
    Ready {
        /// Index of the arriving worker
        worker_index: usize,
    },
    /// The worker's final result, sent exactly once
    Finished(WorkerResult),
    /// The worker task panicked; counts as both arrival and final report
    Crashed {
        /// Index of the crashed worker
        worker_index: usize,
        /// Panic payload, if it was a string
        message: String,
    },
}

/// Channel buffer configuration for orchestrator communication
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Event channel buffer size (workers -> orchestrator), never 0
    event_buffer: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self { event_buffer: 64 }
    }
}

impl ChannelConfig {
    /// Create a new channel config with custom event buffer size
    pub fn with_event_buffer(mut self, size: usize) -> Self {
        self.event_buffer = size.max(1);
        self
    }

    /// Event channel buffer size
    pub fn event_buffer(&self) -> usize {
        self.event_buffer
    }
}

/// Release side of the start gate, held by the orchestrator
#[derive(Debug)]
pub struct StartGate {
    tx: watch::Sender<bool>,
}

/// Waiting side of the start gate, one per worker
#[derive(Debug, Clone)]
pub struct StartSignal {
    rx: watch::Receiver<bool>,
}

impl StartGate {
    /// Create a closed gate and its first signal handle
    pub fn new() -> (Self, StartSignal) {
        let (tx, rx) = watch::channel(false);
        (Self { tx }, StartSignal { rx })
    }

    /// Another waiting handle
    pub fn signal(&self) -> StartSignal {
        StartSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Open the gate. Opening twice is a no-op.
    pub fn open(&self) {
        self.tx.send_replace(true);
    }

    /// Whether the gate has been opened
    pub fn is_open(&self) -> bool {
        *self.tx.borrow()
    }
}

impl StartSignal {
    /// Wait until the gate opens
    ///
    /// Returns `false` if the gate was dropped without ever opening.
    pub async fn wait(&mut self) -> bool {
        self.rx.wait_for(|open| *open).await.is_ok()
    }
}
