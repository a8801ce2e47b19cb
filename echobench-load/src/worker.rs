use crate::connection::EchoConnection;
use echobench_common::{BenchError, Result};
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cooperative stop flag shared between a worker and the orchestrator.
///
/// Stopping is one-way and idempotent: once raised the flag stays raised,
/// and raising it again changes nothing. The worker polls it between
/// cycles, so an in-flight request always runs to completion.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Reconnect policy: a fresh connection is required before the very first
/// cycle and thereafter before every `requests_per_connection`-th one. A
/// threshold of 0 keeps the first connection for the whole run.
pub fn needs_reconnect(completed: usize, requests_per_connection: usize) -> bool {
    completed == 0 || (requests_per_connection != 0 && completed % requests_per_connection == 0)
}

/// Append-only log of connection-open events.
///
/// Each entry is the number of cycles the worker had completed when the
/// connection was opened, so the log doubles as both the connection count
/// and the reconnect timeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionLog(Vec<usize>);

impl ConnectionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful open at the given completed-cycle count.
    pub fn record(&mut self, completed: usize) {
        self.0.push(completed);
    }

    /// Number of connections opened.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Completed-cycle counts at each open, in open order.
    pub fn opens(&self) -> &[usize] {
        &self.0
    }
}

/// Fixed per-worker settings.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Ordinal used in diagnostics only.
    pub id: usize,
    /// Echo endpoint, host:port.
    pub target: String,
    /// Bytes written, and expected back, per cycle.
    pub payload_size: usize,
    /// Cycles served by one connection before it is replaced; 0 = never.
    pub requests_per_connection: usize,
    /// Bound on each dial, write, and echo read.
    pub io_timeout: Duration,
}

/// Drives request/echo cycles over a single connection at a time.
///
/// A worker owns all of its state. It is moved into its task, runs to
/// completion, and hands everything back as a [`WorkerRun`], so no other
/// task ever observes it mid-run.
pub struct Worker {
    config: WorkerConfig,
    conn: Option<EchoConnection>,
    samples: Vec<Duration>,
    connections: ConnectionLog,
    stop: StopSignal,
}

/// What a worker hands back once its task is joined.
#[derive(Debug, Clone)]
pub struct WorkerRun {
    pub id: usize,
    /// One round-trip latency per completed cycle, in completion order.
    pub samples: Vec<Duration>,
    /// Log of every connection the worker opened.
    pub connections: ConnectionLog,
    /// Present when the worker terminated early. Samples collected before
    /// the failure still count.
    pub error: Option<BenchError>,
}

impl Worker {
    pub fn new(config: WorkerConfig) -> Self {
        Worker {
            config,
            conn: None,
            samples: Vec::new(),
            connections: ConnectionLog::new(),
            stop: StopSignal::new(),
        }
    }

    /// Handle for requesting this worker to stop.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Run cycles until stopped or until the first error, then hand back
    /// the collected history.
    pub async fn run(mut self) -> WorkerRun {
        let payload = request_payload(self.config.payload_size);
        let mut scratch = vec![0u8; self.config.payload_size];

        let error = loop {
            if self.stop.is_stopped() {
                break None;
            }
            if let Err(err) = self.cycle(&payload, &mut scratch).await {
                break Some(err);
            }
        };

        // Close whatever connection is still open before reporting.
        self.conn = None;

        WorkerRun {
            id: self.config.id,
            samples: self.samples,
            connections: self.connections,
            error,
        }
    }

    /// One request/echo cycle: ensure a connection, send the payload, wait
    /// for the complete echo, record the round-trip time.
    async fn cycle(&mut self, payload: &[u8], scratch: &mut [u8]) -> Result<()> {
        let conn = self.ensure_connection().await?;
        let start = Instant::now();
        conn.roundtrip(payload, scratch).await?;
        self.samples.push(start.elapsed());
        Ok(())
    }

    /// Return the live connection, first replacing it when the reconnect
    /// policy calls for one. Each successful open is recorded in the
    /// connection log.
    async fn ensure_connection(&mut self) -> Result<&mut EchoConnection> {
        let completed = self.samples.len();
        if self.conn.is_none() || needs_reconnect(completed, self.config.requests_per_connection) {
            // Drop (close) the outgoing connection before dialing its
            // replacement; closing an already-broken stream is harmless.
            self.conn = None;
            let fresh = EchoConnection::open(
                self.config.id,
                &self.config.target,
                self.config.io_timeout,
            )
            .await?;
            self.connections.record(completed);
            self.conn = Some(fresh);
        }
        Ok(self.conn.as_mut().expect("connection opened above"))
    }
}

/// Build the request payload: `size` random bytes, fixed for the worker's
/// lifetime. The server never interprets them.
pub fn request_payload(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen::<u8>()).collect()
}
