use clap::Parser;
use echobench_common::DEFAULT_TARGET_ADDR;
use echobench_server::{Server, ServerConfig};
use std::net::SocketAddr;

#[derive(Parser, Debug)]
#[command(name = "echobench-server", about = "TCP byte-echo server for echobench")]
struct Args {
    /// Address to listen on (host:port; port 0 picks a free port)
    #[arg(long, default_value = DEFAULT_TARGET_ADDR)]
    address: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let (ready_tx, ready_rx) = tokio::sync::oneshot::channel();

    // Print "Listening on <addr>" once the server signals it is bound.
    tokio::spawn(async move {
        if let Ok(addr) = ready_rx.await {
            println!("Listening on {}", addr);
        }
    });

    Server::new(ServerConfig { address: args.address }).run(ready_tx).await?;
    Ok(())
}
