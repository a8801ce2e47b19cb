use crate::config::BenchConfig;
use crate::worker::{Worker, WorkerConfig, WorkerRun};
use tracing::{error, warn};

/// Run the benchmark: spawn one worker per configured connection, let them
/// drive cycles for the configured duration, stop each exactly once, then
/// join them all before any history is read.
///
/// A failed worker does not abort the run; its samples up to the failure
/// are kept and the rest of the workers carry on until the deadline.
pub async fn run(config: &BenchConfig) -> Vec<WorkerRun> {
    let workers: Vec<Worker> = (0..config.connections)
        .map(|id| {
            Worker::new(WorkerConfig {
                id,
                target: config.target.clone(),
                payload_size: config.payload_size,
                requests_per_connection: config.requests_per_connection,
                io_timeout: config.io_timeout,
            })
        })
        .collect();

    let stops: Vec<_> = workers.iter().map(|w| w.stop_signal()).collect();
    let handles: Vec<_> = workers
        .into_iter()
        .map(|worker| tokio::spawn(worker.run()))
        .collect();

    tokio::time::sleep(config.duration).await;

    for stop in &stops {
        stop.stop();
    }

    let mut runs = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok(run) => {
                if let Some(err) = &run.error {
                    warn!(worker = run.id, %err, "worker terminated early");
                }
                runs.push(run);
            }
            // A panicked worker contributes nothing; the report is built
            // from whatever the others collected.
            Err(join_err) => error!(%join_err, "worker task did not finish"),
        }
    }
    runs
}
