use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tracing::warn;

/// Echo server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub address: SocketAddr,
}

/// TCP echo server: every byte written to a connection is copied back onto
/// the same connection, in order, unmodified.
pub struct Server {
    config: ServerConfig,
}

impl Server {
    /// Create a new server with the given configuration
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Get the server's configured address
    pub fn address(&self) -> SocketAddr {
        self.config.address
    }

    /// Run the server, signalling `ready_tx` with the bound address once accepting
    /// connections. Binding to port 0 is supported; the signalled address carries
    /// the port the OS actually assigned.
    pub async fn run(
        self,
        ready_tx: tokio::sync::oneshot::Sender<SocketAddr>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(self.config.address).await?;
        let local_addr = listener.local_addr()?;
        ready_tx.send(local_addr).ok();

        loop {
            let (stream, peer) = listener.accept().await?;
            tokio::spawn(async move {
                if let Err(err) = echo_connection(stream).await {
                    warn!(%peer, %err, "echo transfer failed");
                }
            });
        }
    }
}

/// Copy every byte read on `stream` back onto it until the peer closes.
async fn echo_connection(mut stream: TcpStream) -> std::io::Result<u64> {
    let (mut reader, mut writer) = stream.split();
    tokio::io::copy(&mut reader, &mut writer).await
}
