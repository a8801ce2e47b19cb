use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Default target address for both the benchmark tool and the echo server.
pub const DEFAULT_TARGET_ADDR: &str = "127.0.0.1:1234";

/// Default number of parallel connections driven by the benchmark.
pub const DEFAULT_CONNECTIONS: usize = 1;

/// Default request payload size in bytes.
pub const DEFAULT_PAYLOAD_SIZE: usize = 1024;

/// Default wall-clock length of a benchmark run.
pub const DEFAULT_RUN_DURATION: Duration = Duration::from_secs(1);

/// Default bound on a single dial, write, or echo read before the worker
/// gives up and fails the run for that connection.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(10);

/// The transfer phase that failed, carried by [`BenchError::Transfer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOp {
    Write,
    Read,
}

impl fmt::Display for TransferOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferOp::Write => write!(f, "write"),
            TransferOp::Read => write!(f, "read"),
        }
    }
}

/// Error types for benchmark operations.
///
/// `Connection` and `Transfer` are fatal only to the worker they name;
/// samples that worker collected before the failure remain valid.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BenchError {
    #[error("failed to establish connection to {target} (worker {worker}): {cause}")]
    Connection {
        worker: usize,
        target: String,
        cause: String,
    },

    #[error("failed to {op} (worker {worker}): {cause}")]
    Transfer {
        worker: usize,
        op: TransferOp,
        cause: String,
    },

    #[error("no request samples were recorded")]
    EmptySampleSet,
}

/// Result type for benchmark operations.
pub type Result<T> = std::result::Result<T, BenchError>;
