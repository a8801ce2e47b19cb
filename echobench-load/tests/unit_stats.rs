use echobench_common::{BenchError, TransferOp};
use echobench_load::stats::{percentile_index, Report};
use echobench_load::worker::{ConnectionLog, WorkerRun};
use std::time::Duration;

fn run_with_samples(id: usize, millis: &[u64], opens: &[usize]) -> WorkerRun {
    let mut connections = ConnectionLog::new();
    for &at in opens {
        connections.record(at);
    }
    WorkerRun {
        id,
        samples: millis.iter().map(|&m| Duration::from_millis(m)).collect(),
        connections,
        error: None,
    }
}

// --- Percentile index ---

#[test]
fn test_percentile_index_median_of_ten() {
    // Rank 10 * 0.5 + 0.5 = 5.5 rounds to 6, so the 0-based index is 5.
    assert_eq!(percentile_index(10, 0.5), 5);
}

#[test]
fn test_percentile_index_single_sample() {
    for p in [0.5, 0.9, 0.95, 0.99, 0.999] {
        assert_eq!(percentile_index(1, p), 0);
    }
}

#[test]
fn test_percentile_index_always_in_bounds() {
    for n in 1..=500 {
        for p in [0.001, 0.25, 0.5, 0.9, 0.95, 0.99, 0.999] {
            let idx = percentile_index(n, p);
            assert!(idx < n, "index {} out of bounds for n={} p={}", idx, n, p);
        }
    }
}

#[test]
fn test_percentile_index_monotonic_in_p() {
    for n in 1..=200 {
        assert!(percentile_index(n, 0.95) <= percentile_index(n, 0.99));
    }
}

#[test]
fn test_percentile_index_uniform_two_hundred() {
    assert_eq!(percentile_index(200, 0.95), 190);
    assert_eq!(percentile_index(200, 0.99), 198);
}

// --- Report aggregation ---

#[test]
fn test_report_from_single_run() {
    let runs = vec![run_with_samples(0, &[2, 1, 3], &[0])];
    let report = Report::from_runs(&runs, Duration::from_secs(1)).unwrap();

    assert_eq!(report.connections_total, 1);
    assert_eq!(report.requests_total, 3);
    assert_eq!(report.duration_min, Duration::from_millis(1));
    assert_eq!(report.duration_max, Duration::from_millis(3));
    assert_eq!(report.duration_avg, Duration::from_millis(2));
    assert_eq!(
        report.sorted_samples,
        vec![
            Duration::from_millis(1),
            Duration::from_millis(2),
            Duration::from_millis(3)
        ]
    );
}

#[test]
fn test_report_pools_samples_across_workers() {
    let runs = vec![
        run_with_samples(0, &[5, 1], &[0]),
        run_with_samples(1, &[3, 9, 7], &[0, 2]),
    ];
    let report = Report::from_runs(&runs, Duration::from_secs(1)).unwrap();

    assert_eq!(report.connections_total, 3);
    assert_eq!(report.requests_total, 5);
    assert_eq!(report.duration_min, Duration::from_millis(1));
    assert_eq!(report.duration_max, Duration::from_millis(9));
    assert_eq!(report.duration_avg, Duration::from_millis(5));
}

#[test]
fn test_report_keeps_samples_from_failed_worker() {
    let mut failed = run_with_samples(1, &[8], &[0]);
    failed.error = Some(BenchError::Transfer {
        worker: 1,
        op: TransferOp::Read,
        cause: "connection reset by peer".to_string(),
    });
    let runs = vec![run_with_samples(0, &[2, 4], &[0]), failed];
    let report = Report::from_runs(&runs, Duration::from_secs(1)).unwrap();

    assert_eq!(report.requests_total, 3);
    assert_eq!(report.duration_max, Duration::from_millis(8));
}

#[test]
fn test_report_bounds_hold_over_uneven_pool() {
    let millis = [17, 3, 250, 3, 42, 99, 8, 8, 120, 1, 61];
    let runs = vec![
        run_with_samples(0, &millis[..5], &[0]),
        run_with_samples(1, &millis[5..], &[0]),
    ];
    let report = Report::from_runs(&runs, Duration::from_secs(1)).unwrap();

    for &sample in &report.sorted_samples {
        assert!(report.duration_min <= sample);
        assert!(sample <= report.duration_max);
    }
    let sum: u64 = millis.iter().sum();
    assert_eq!(
        report.duration_avg,
        Duration::from_millis(sum) / millis.len() as u32
    );
    assert!(report.duration_min <= report.duration_p95);
    assert!(report.duration_p95 <= report.duration_p99);
    assert!(report.duration_p99 <= report.duration_max);
}

#[test]
fn test_report_average_is_exact() {
    let runs = vec![run_with_samples(0, &[1, 2], &[0])];
    let report = Report::from_runs(&runs, Duration::from_secs(1)).unwrap();
    assert_eq!(report.duration_avg, Duration::from_micros(1500));
}

#[test]
fn test_report_average_survives_huge_sample_sums() {
    // The pooled total here overflows what a single Duration can hold;
    // the average must still come out exact instead of wrapping.
    let mut connections = ConnectionLog::new();
    connections.record(0);
    let runs = vec![WorkerRun {
        id: 0,
        samples: vec![Duration::MAX, Duration::MAX],
        connections,
        error: None,
    }];
    let report = Report::from_runs(&runs, Duration::from_secs(1)).unwrap();

    assert_eq!(report.duration_avg, Duration::MAX);
    assert_eq!(report.duration_min, Duration::MAX);
    assert_eq!(report.duration_max, Duration::MAX);
}

#[test]
fn test_report_throughput_uses_nominal_duration() {
    let runs = vec![run_with_samples(0, &[1; 10], &[0])];
    let report = Report::from_runs(&runs, Duration::from_secs(2)).unwrap();
    assert_eq!(report.requests_per_second, 5.0);
}

#[test]
fn test_report_percentiles_on_uniform_pool() {
    let millis: Vec<u64> = (1..=200).collect();
    let runs = vec![run_with_samples(0, &millis, &[0])];
    let report = Report::from_runs(&runs, Duration::from_secs(1)).unwrap();

    assert_eq!(report.duration_p95, Duration::from_millis(191));
    assert_eq!(report.duration_p99, Duration::from_millis(199));
}

// --- Empty sample sets ---

#[test]
fn test_report_rejects_no_runs() {
    let err = Report::from_runs(&[], Duration::from_secs(1)).unwrap_err();
    assert_eq!(err, BenchError::EmptySampleSet);
}

#[test]
fn test_report_rejects_runs_without_samples() {
    let mut failed = run_with_samples(0, &[], &[0]);
    failed.error = Some(BenchError::Connection {
        worker: 0,
        target: "127.0.0.1:1".to_string(),
        cause: "connection refused".to_string(),
    });
    let err = Report::from_runs(&[failed], Duration::from_secs(1)).unwrap_err();
    assert_eq!(err, BenchError::EmptySampleSet);
}

// --- Rendering ---

#[test]
fn test_report_display_layout() {
    let runs = vec![run_with_samples(0, &[2, 1, 3], &[0])];
    let report = Report::from_runs(&runs, Duration::from_secs(1)).unwrap();
    let text = report.to_string();

    assert!(text.contains("total connections: 1"));
    assert!(text.contains("  total 3"));
    assert!(text.contains("  throughput 3.00 req/s"));
    assert!(text.contains("  avg 2ms"));
    assert!(text.contains("  min 1ms"));
    assert!(text.contains("  max 3ms"));
    assert!(text.contains("  p95 "));
    assert!(text.contains("  p99 "));
}

#[test]
fn test_report_json_shape() {
    let runs = vec![run_with_samples(0, &[2, 1, 3], &[0])];
    let report = Report::from_runs(&runs, Duration::from_secs(1)).unwrap();
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["connections_total"], 1);
    assert_eq!(value["requests_total"], 3);
    assert_eq!(value["duration"], 1.0);
    assert_eq!(value["duration_min"], 0.001);
    assert!(value["requests_per_second"].is_f64());
    // The raw sample pool stays out of the JSON document.
    assert!(value.get("sorted_samples").is_none());
}
