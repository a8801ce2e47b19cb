use echobench_common::{BenchError, Result, TransferOp};
use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Read from `reader` until exactly `expected` bytes have arrived.
///
/// The echo may come back split across any number of partial reads; each
/// read fills up to `scratch.len()` bytes and only the running total
/// matters. The stream ending early is an `UnexpectedEof` error, and a
/// total that passes `expected` is an `InvalidData` error: a peer echoing
/// more than it was sent has broken the protocol, and waiting for the
/// count to land on `expected` would never return.
pub async fn read_echo<R>(reader: &mut R, scratch: &mut [u8], expected: usize) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut received = 0;
    while received < expected {
        let n = reader.read(scratch).await?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("connection closed after {received} of {expected} echoed bytes"),
            ));
        }
        received += n;
        if received > expected {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("peer echoed {received} bytes for a {expected}-byte request"),
            ));
        }
    }
    Ok(())
}

/// One live connection to the echo endpoint, owned by a single worker.
///
/// Every blocking phase (dial, write, echo read) is bounded by the
/// configured I/O timeout, so a stalled peer surfaces as an error instead
/// of hanging the run past its deadline.
#[derive(Debug)]
pub struct EchoConnection {
    stream: TcpStream,
    worker: usize,
    io_timeout: Duration,
}

impl EchoConnection {
    /// Dial `target` on behalf of worker `worker`.
    pub async fn open(worker: usize, target: &str, io_timeout: Duration) -> Result<Self> {
        let stream = match timeout(io_timeout, TcpStream::connect(target)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(err)) => {
                return Err(BenchError::Connection {
                    worker,
                    target: target.to_string(),
                    cause: err.to_string(),
                })
            }
            Err(_) => {
                return Err(BenchError::Connection {
                    worker,
                    target: target.to_string(),
                    cause: timed_out(io_timeout),
                })
            }
        };
        Ok(EchoConnection {
            stream,
            worker,
            io_timeout,
        })
    }

    /// Send `payload` and wait for the complete echo. `scratch` receives
    /// the echoed chunks; its contents carry no meaning afterwards.
    pub async fn roundtrip(&mut self, payload: &[u8], scratch: &mut [u8]) -> Result<()> {
        match timeout(self.io_timeout, self.stream.write_all(payload)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => return Err(self.transfer_error(TransferOp::Write, err.to_string())),
            Err(_) => {
                return Err(self.transfer_error(TransferOp::Write, timed_out(self.io_timeout)))
            }
        }
        match timeout(
            self.io_timeout,
            read_echo(&mut self.stream, scratch, payload.len()),
        )
        .await
        {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(self.transfer_error(TransferOp::Read, err.to_string())),
            Err(_) => Err(self.transfer_error(TransferOp::Read, timed_out(self.io_timeout))),
        }
    }

    fn transfer_error(&self, op: TransferOp, cause: String) -> BenchError {
        BenchError::Transfer {
            worker: self.worker,
            op,
            cause,
        }
    }
}

fn timed_out(after: Duration) -> String {
    format!("timed out after {after:?}")
}
