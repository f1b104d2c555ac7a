//! Metrics and observability utilities
//!
//! Prometheus metrics for content writes and backup exports, named with a
//! shared prefix. Recording is a no-op until a recorder is installed.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use std::time::Duration;

/// Metrics prefix for all Inkpress metrics
pub const METRICS_PREFIX: &str = "inkpress";

/// Buckets for backup export latency (in seconds)
pub const BACKUP_BUCKETS: &[f64] = &[
    0.010, // 10ms
    0.050, // 50ms
    0.100, // 100ms
    0.250, // 250ms
    0.500, // 500ms
    1.000, // 1s
    2.500, // 2.5s
    5.000, // 5s
    10.00, // 10s
    30.00, // 30s
];

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_content_writes_total", METRICS_PREFIX),
        Unit::Count,
        "Total create, update and delete operations on articles, categories and tags"
    );

    describe_counter!(
        format!("{}_backups_total", METRICS_PREFIX),
        Unit::Count,
        "Total backup exports"
    );

    describe_histogram!(
        format!("{}_backup_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Backup export latency in seconds"
    );

    describe_gauge!(
        format!("{}_backup_articles", METRICS_PREFIX),
        Unit::Count,
        "Articles included in the most recent backup"
    );

    describe_counter!(
        format!("{}_backup_skipped_entries_total", METRICS_PREFIX),
        Unit::Count,
        "Per-article backup entries that could not be written"
    );

    tracing::info!("Metrics registered");
}

/// Record a successful write against `entity` (`article`, `category`, `tag`)
pub fn record_write(entity: &'static str, operation: &'static str) {
    counter!(
        format!("{}_content_writes_total", METRICS_PREFIX),
        "entity" => entity,
        "operation" => operation
    )
    .increment(1);
}

/// Record the outcome of a backup export
pub fn record_backup(elapsed: Duration, article_count: usize, skipped: usize, success: bool) {
    let status = if success { "success" } else { "error" };

    counter!(
        format!("{}_backups_total", METRICS_PREFIX),
        "status" => status
    )
    .increment(1);

    if success {
        histogram!(format!("{}_backup_duration_seconds", METRICS_PREFIX))
            .record(elapsed.as_secs_f64());
        gauge!(format!("{}_backup_articles", METRICS_PREFIX)).set(article_count as f64);
        counter!(format!("{}_backup_skipped_entries_total", METRICS_PREFIX))
            .increment(skipped as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backup_buckets_sorted() {
        let mut prev = 0.0;
        for &bucket in BACKUP_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }
    }

    #[test]
    fn test_recording_without_recorder() {
        register_metrics();
        record_write("article", "create");
        record_backup(Duration::from_millis(12), 3, 1, true);
        record_backup(Duration::from_millis(1), 0, 0, false);
    }
}
