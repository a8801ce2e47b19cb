use crate::worker::WorkerRun;
use echobench_common::{BenchError, Result};
use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// 0-based index of the percentile-`p` order statistic over `n` sorted
/// samples: the 1-based rank `n * p + 0.5`, rounded to the nearest integer
/// with halves going up, shifted down by one. Requires `n >= 1`; for `p`
/// strictly between 0 and 1 the result is always a valid index.
pub fn percentile_index(n: usize, p: f64) -> usize {
    (n as f64 * p + 0.5).round() as usize - 1
}

/// Aggregate outcome of a run, computed once after every worker task has
/// been joined.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Nominal run duration. Throughput is measured against this, not
    /// against wall-clock drift, so repeated runs stay comparable.
    #[serde(serialize_with = "duration_secs")]
    pub duration: Duration,
    pub connections_total: usize,
    pub requests_total: usize,
    pub requests_per_second: f64,
    #[serde(serialize_with = "duration_secs")]
    pub duration_avg: Duration,
    #[serde(serialize_with = "duration_secs")]
    pub duration_min: Duration,
    #[serde(serialize_with = "duration_secs")]
    pub duration_max: Duration,
    #[serde(serialize_with = "duration_secs")]
    pub duration_p95: Duration,
    #[serde(serialize_with = "duration_secs")]
    pub duration_p99: Duration,
    /// Pooled round-trip times sorted ascending, kept for the chart.
    #[serde(skip)]
    pub sorted_samples: Vec<Duration>,
}

impl Report {
    /// Merge every worker's history into one report.
    ///
    /// Fails with [`BenchError::EmptySampleSet`] when not a single cycle
    /// completed, since min, max, and the percentiles are undefined then.
    pub fn from_runs(runs: &[WorkerRun], duration: Duration) -> Result<Report> {
        let connections_total = runs.iter().map(|r| r.connections.len()).sum();
        let requests_total: usize = runs.iter().map(|r| r.samples.len()).sum();

        let mut sorted: Vec<Duration> = runs
            .iter()
            .flat_map(|r| r.samples.iter().copied())
            .collect();
        if sorted.is_empty() {
            return Err(BenchError::EmptySampleSet);
        }
        sorted.sort_unstable();

        let n = sorted.len();
        let total_nanos: u128 = sorted.iter().map(|d| d.as_nanos()).sum();

        Ok(Report {
            duration,
            connections_total,
            requests_total,
            requests_per_second: requests_total as f64 / duration.as_secs_f64(),
            duration_avg: duration_from_nanos(total_nanos / n as u128),
            duration_min: sorted[0],
            duration_max: sorted[n - 1],
            duration_p95: sorted[percentile_index(n, 0.95)],
            duration_p99: sorted[percentile_index(n, 0.99)],
            sorted_samples: sorted,
        })
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "total connections: {}", self.connections_total)?;
        writeln!(f, "requests:")?;
        writeln!(f, "  total {}", self.requests_total)?;
        writeln!(f, "  throughput {:.2} req/s", self.requests_per_second)?;
        writeln!(f, "request duration:")?;
        writeln!(f, "  avg {:?}", self.duration_avg)?;
        writeln!(f, "  min {:?}", self.duration_min)?;
        writeln!(f, "  max {:?}", self.duration_max)?;
        writeln!(f, "  p95 {:?}", self.duration_p95)?;
        write!(f, "  p99 {:?}", self.duration_p99)
    }
}

/// Serialize a duration as fractional seconds.
fn duration_secs<S: Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Rebuild a duration from a 128-bit nanosecond count. The pooled average
/// never exceeds the largest sample, so the seconds part fits in `u64`.
fn duration_from_nanos(nanos: u128) -> Duration {
    Duration::new((nanos / NANOS_PER_SEC) as u64, (nanos % NANOS_PER_SEC) as u32)
}
