use echobench_common::{
    DEFAULT_CONNECTIONS, DEFAULT_IO_TIMEOUT, DEFAULT_PAYLOAD_SIZE, DEFAULT_RUN_DURATION,
    DEFAULT_TARGET_ADDR,
};
use std::time::Duration;

/// Everything one benchmark run needs to know.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Number of workers, one connection each.
    pub connections: usize,
    /// Bytes per request payload; the echo must return exactly as many.
    pub payload_size: usize,
    /// Requests served by one connection before it is replaced. 0 keeps the
    /// first connection for the whole run.
    pub requests_per_connection: usize,
    /// Echo endpoint, host:port.
    pub target: String,
    /// Wall-clock length of the measurement window.
    pub duration: Duration,
    /// Bound on each dial, write, and echo read.
    pub io_timeout: Duration,
}

impl Default for BenchConfig {
    fn default() -> Self {
        BenchConfig {
            connections: DEFAULT_CONNECTIONS,
            payload_size: DEFAULT_PAYLOAD_SIZE,
            requests_per_connection: 0,
            target: DEFAULT_TARGET_ADDR.to_string(),
            duration: DEFAULT_RUN_DURATION,
            io_timeout: DEFAULT_IO_TIMEOUT,
        }
    }
}
