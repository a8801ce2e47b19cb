use clap::Parser;
use echobench_common::{DEFAULT_CONNECTIONS, DEFAULT_PAYLOAD_SIZE, DEFAULT_TARGET_ADDR};
use echobench_load::config::BenchConfig;
use echobench_load::stats::Report;
use echobench_load::{chart, runner};
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "echobench", about = "TCP echo throughput and latency benchmark")]
struct Args {
    /// Number of parallel connections
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONNECTIONS)]
    connections: usize,

    /// Request payload size in bytes
    #[arg(short = 's', long = "size", default_value_t = DEFAULT_PAYLOAD_SIZE)]
    size: usize,

    /// Requests sent through one connection before it is replaced
    /// (0 = keep the first connection for the whole run)
    #[arg(short = 'r', long = "requests-per-conn", default_value_t = 0)]
    requests_per_conn: usize,

    /// How long to run, e.g. "1s" or "250ms"
    #[arg(short = 'd', long, default_value = "1s", value_parser = parse_duration)]
    duration: Duration,

    /// Target address (host:port)
    #[arg(short = 't', long, default_value = DEFAULT_TARGET_ADDR)]
    target: String,

    /// Draw a terminal chart of request durations after the report
    #[arg(short = 'g', long = "graph")]
    graph: bool,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Give up on a dial, write, or echo read after this long
    #[arg(long, default_value = "10s", value_parser = parse_duration)]
    io_timeout: Duration,
}

/// Parse a duration string like "250ms", "1s", or "2m".
fn parse_duration(s: &str) -> Result<Duration, humantime::DurationError> {
    humantime::parse_duration(s)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args = Args::parse();
    if args.connections == 0 {
        eprintln!("-c must be at least 1");
        process::exit(2);
    }
    if args.size == 0 {
        eprintln!("-s must be at least 1");
        process::exit(2);
    }

    let config = BenchConfig {
        connections: args.connections,
        payload_size: args.size,
        requests_per_connection: args.requests_per_conn,
        target: args.target,
        duration: args.duration,
        io_timeout: args.io_timeout,
    };

    let runs = runner::run(&config).await;

    match Report::from_runs(&runs, config.duration) {
        Ok(report) => {
            if args.json {
                let json =
                    serde_json::to_string_pretty(&report).expect("report serializes to JSON");
                println!("{json}");
            } else {
                println!("{report}");
            }
            if args.graph {
                print!(
                    "{}",
                    chart::render(&report.sorted_samples, chart::DEFAULT_WIDTH, chart::DEFAULT_HEIGHT)
                );
            }
        }
        Err(err) => {
            // Even a run with no completed request reports its totals; only
            // the derived statistics are unavailable. The process still
            // exits 0: an unreachable target is a measurement result.
            let connections_total: usize = runs.iter().map(|r| r.connections.len()).sum();
            println!("total connections: {connections_total}");
            println!("requests:");
            println!("  total 0");
            println!("  throughput 0.00 req/s");
            println!("{err}");
        }
    }
}
