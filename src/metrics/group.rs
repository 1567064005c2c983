//! Timed groups and timing handles.
//!
//! A [`TimedGroup`] carries the base (service) name and starts one
//! [`TimingHandle`] per measured operation. Handles are consumed by their
//! terminal transitions, so a single handle can never record twice; the
//! cross-frame idempotence lives in the correlation state machine, which
//! guarantees a handle is looked up, not re-created, once started.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use super::clock::{Clock, MonotonicClock};

/// Terminal outcome of one measured operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The call completed normally.
    Success,
    /// The call ended in a fault.
    Error,
}

/// Opaque backend elapsed times are recorded into.
///
/// The core makes no assumption about storage or export format; it only
/// ever calls `record`, exactly once per completed measurement.
pub trait MetricSink: Send + Sync {
    /// Record one completed measurement.
    fn record(&self, operation: &str, elapsed: Duration, outcome: Outcome);
}

/// Names and starts measurements for one service.
///
/// Metrics are keyed by `"{base}.{operation}"`, the base name identifying
/// the service and the operation name identifying the call.
#[derive(Clone)]
pub struct TimedGroup {
    base: String,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn MetricSink>,
}

impl TimedGroup {
    /// Create a group recording into `sink` with the real monotonic clock.
    pub fn new(base: &str, sink: Arc<dyn MetricSink>) -> Self {
        Self::with_clock(base, Arc::new(MonotonicClock), sink)
    }

    /// Create a group with an explicit clock.
    pub fn with_clock(base: &str, clock: Arc<dyn Clock>, sink: Arc<dyn MetricSink>) -> Self {
        Self {
            base: base.to_string(),
            clock,
            sink,
        }
    }

    /// Get the base (service) name.
    #[inline]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Start a measurement for `operation`.
    pub fn begin(&self, operation: &str) -> TimingHandle {
        let name = if self.base.is_empty() {
            operation.to_string()
        } else {
            format!("{}.{}", self.base, operation)
        };
        TimingHandle {
            name,
            started: self.clock.now(),
            clock: self.clock.clone(),
            sink: self.sink.clone(),
        }
    }
}

impl fmt::Debug for TimedGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedGroup").field("base", &self.base).finish()
    }
}

/// The start/outcome record for one exchange's measurement.
///
/// Created at most once per exchange; the terminal transitions consume the
/// handle, so ending twice is unrepresentable.
pub struct TimingHandle {
    name: String,
    started: Instant,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn MetricSink>,
}

impl TimingHandle {
    /// Full metric name this handle records under.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Time elapsed since the measurement started.
    pub fn elapsed(&self) -> Duration {
        self.clock.now().saturating_duration_since(self.started)
    }

    /// End the measurement with a success outcome.
    pub fn end_with_success(self) {
        self.end(Outcome::Success);
    }

    /// End the measurement with an error outcome.
    pub fn end_with_error(self) {
        self.end(Outcome::Error);
    }

    /// End the measurement with an explicit outcome.
    pub fn end(self, outcome: Outcome) {
        let elapsed = self.elapsed();
        self.sink.record(&self.name, elapsed, outcome);
    }
}

impl fmt::Debug for TimingHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimingHandle")
            .field("name", &self.name)
            .field("started", &self.started)
            .finish()
    }
}
