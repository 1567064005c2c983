//! In-memory metric sink.
//!
//! [`MetricRegistry`] is the default [`MetricSink`]: per-operation counts
//! and elapsed-time aggregates behind an `RwLock`. Hosts with a real
//! metrics backend implement [`MetricSink`] themselves; this one covers
//! tests and processes that just want a snapshot to export.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::RwLock;
use serde::Serialize;

use super::group::{MetricSink, Outcome};

/// Aggregated statistics for one named operation.
#[derive(Debug, Clone, Serialize)]
pub struct OperationStats {
    /// Total number of completed measurements.
    pub count: u64,
    /// Measurements that ended with success.
    pub successes: u64,
    /// Measurements that ended with error.
    pub errors: u64,
    /// Total elapsed time.
    pub total: Duration,
    /// Minimum elapsed time.
    pub min: Duration,
    /// Maximum elapsed time.
    pub max: Duration,
}

impl OperationStats {
    fn new() -> Self {
        Self {
            count: 0,
            successes: 0,
            errors: 0,
            total: Duration::ZERO,
            min: Duration::MAX,
            max: Duration::ZERO,
        }
    }

    fn record(&mut self, elapsed: Duration, outcome: Outcome) {
        self.count += 1;
        match outcome {
            Outcome::Success => self.successes += 1,
            Outcome::Error => self.errors += 1,
        }
        self.total += elapsed;
        self.min = self.min.min(elapsed);
        self.max = self.max.max(elapsed);
    }

    /// Mean elapsed time across all measurements.
    pub fn mean(&self) -> Duration {
        if self.count == 0 {
            Duration::ZERO
        } else {
            self.total / self.count as u32
        }
    }

    /// Fraction of measurements that ended with success (0.0 to 1.0).
    pub fn success_rate(&self) -> f64 {
        if self.count == 0 {
            1.0
        } else {
            self.successes as f64 / self.count as f64
        }
    }
}

/// Thread-safe in-memory sink keyed by full metric name.
#[derive(Debug, Default)]
pub struct MetricRegistry {
    operations: RwLock<HashMap<String, OperationStats>>,
}

impl MetricRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            operations: RwLock::new(HashMap::new()),
        }
    }

    /// Get statistics for a named operation.
    pub fn stats(&self, name: &str) -> Option<OperationStats> {
        self.operations.read().get(name).cloned()
    }

    /// Number of distinct operation names recorded.
    pub fn operation_count(&self) -> usize {
        self.operations.read().len()
    }

    /// Take a snapshot of all recorded operations.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            operations: self.operations.read().clone(),
        }
    }

    /// Drop all recorded statistics.
    pub fn reset(&self) {
        self.operations.write().clear();
    }
}

impl MetricSink for MetricRegistry {
    fn record(&self, operation: &str, elapsed: Duration, outcome: Outcome) {
        let mut operations = self.operations.write();
        operations
            .entry(operation.to_string())
            .or_insert_with(OperationStats::new)
            .record(elapsed, outcome);
    }
}

/// A point-in-time copy of all recorded statistics, serializable for export.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Statistics keyed by full metric name.
    pub operations: HashMap<String, OperationStats>,
}
