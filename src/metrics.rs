//! Metrics instrumentation for memory-sync.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The parent process is responsible for choosing the exporter.
//!
//! # Metric Naming Convention
//! - `memory_sync_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `pillar`: registered pillar name
//! - `operation`: connect, sync, query, store, flush
//! - `status`: success, error, timeout, skipped

use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Record one pillar operation outcome.
pub fn record_operation(pillar: &str, operation: &str, status: &str) {
    counter!(
        "memory_sync_operations_total",
        "pillar" => pillar.to_string(),
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record pillar operation latency.
pub fn record_latency(pillar: &str, operation: &str, duration: Duration) {
    histogram!(
        "memory_sync_operation_seconds",
        "pillar" => pillar.to_string(),
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record how many pillars a fan-out call targeted.
pub fn record_fanout_targets(operation: &str, count: usize) {
    histogram!(
        "memory_sync_fanout_targets",
        "operation" => operation.to_string()
    )
    .record(count as f64);
}

/// Record one query hit count after merge.
pub fn record_query_hits(count: usize) {
    histogram!("memory_sync_query_hits").record(count as f64);
}

/// Set the number of pillars currently Online.
pub fn set_pillars_online(count: usize) {
    gauge!("memory_sync_pillars_online").set(count as f64);
}

/// Record one completed background sync cycle.
pub fn record_sync_cycle(synced: usize, reconnected: usize, failed: usize) {
    counter!("memory_sync_cycles_total").increment(1);
    counter!("memory_sync_cycle_synced_total").increment(synced as u64);
    counter!("memory_sync_cycle_reconnected_total").increment(reconnected as u64);
    counter!("memory_sync_cycle_failed_total").increment(failed as u64);
}
