//! Metrics module - timing handles and the measurement sink.
//!
//! Provides:
//! - [`TimedGroup`] - names and starts measurements for one service
//! - [`TimingHandle`] - the start/outcome record for one exchange
//! - [`MetricSink`] - opaque backend the elapsed time is recorded into
//! - [`MetricRegistry`] - default in-memory sink with snapshot export
//! - [`Clock`] - monotonic time source, swappable for tests
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use pipetime::metrics::{MetricRegistry, Outcome, TimedGroup};
//!
//! let registry = Arc::new(MetricRegistry::new());
//! let group = TimedGroup::new("webservice.echo-service", registry.clone());
//!
//! let handle = group.begin("echo");
//! handle.end_with_success();
//!
//! let stats = registry.stats("webservice.echo-service.echo").unwrap();
//! assert_eq!(stats.successes, 1);
//! ```

mod clock;
mod group;
mod registry;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use group::{MetricSink, Outcome, TimedGroup, TimingHandle};
pub use registry::{MetricRegistry, MetricsSnapshot, OperationStats};
