//! Timing correlation state machine.
//!
//! Pipelines process inbound and outbound frames as independent passes
//! with no built-in notion of "this inbound frame and that outbound frame
//! are the same logical call". [`TimingCorrelator`] reconstructs that
//! correlation: it owns the map from exchange identity to the one live
//! [`TimingHandle`](crate::metrics::TimingHandle) and drives each exchange
//! through `New -> Started -> Ended`, monotonically and idempotently in
//! both directions.
//!
//! Frameworks may invoke handlers multiple times for the same logical
//! phase (retries, partial responses, duplicate fault dispatch), so:
//!
//! - `begin` on a `Started` or `Ended` exchange is a no-op
//! - `end` on a `New` or `Ended` exchange is a no-op
//! - `Ended` is terminal; an ended exchange can never restart
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use pipetime::correlate::{TimingCorrelator, TimingState};
//! use pipetime::exchange::ExchangeId;
//! use pipetime::metrics::{MetricRegistry, TimedGroup};
//!
//! let registry = Arc::new(MetricRegistry::new());
//! let correlator = TimingCorrelator::new(TimedGroup::new("svc", registry.clone()));
//!
//! let ex = ExchangeId::next();
//! correlator.begin(ex, "echo");
//! correlator.end(ex, false);
//!
//! assert_eq!(correlator.state(ex), TimingState::Ended);
//! assert_eq!(registry.stats("svc.echo").unwrap().successes, 1);
//! ```

use tracing::debug;

use crate::exchange::{ExchangeId, ExchangeStore};
use crate::metrics::{TimedGroup, TimingHandle};

/// Per-exchange slot in the correlation store.
///
/// `Ended` is a tombstone: it keeps late duplicate frames from re-starting
/// or re-ending the measurement until the host discards the exchange.
enum TimingSlot {
    Started {
        handle: TimingHandle,
        faulted: bool,
    },
    Ended,
}

/// Observable correlation state of one exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingState {
    /// No measurement started.
    New,
    /// Measurement running.
    Started,
    /// Measurement closed; terminal.
    Ended,
}

/// Correlates frame passes of one logical call into a single measurement.
///
/// Invoked synchronously by the host pipeline on whatever thread handles a
/// given pass. Passes for one exchange are causally ordered by the host;
/// distinct exchanges may run concurrently, which the underlying store
/// handles without cross-exchange locking.
pub struct TimingCorrelator {
    group: TimedGroup,
    slots: ExchangeStore<TimingSlot>,
}

impl TimingCorrelator {
    /// Create a correlator recording measurements through `group`.
    pub fn new(group: TimedGroup) -> Self {
        Self {
            group,
            slots: ExchangeStore::new(),
        }
    }

    /// Start the measurement for an exchange.
    ///
    /// Valid only from `New`; on a `Started` or `Ended` exchange this is a
    /// no-op, so duplicate or partial start frames cannot re-trigger a
    /// start or leak a second handle.
    pub fn begin(&self, exchange: ExchangeId, operation: &str) {
        let inserted = self.slots.put_if_absent(exchange, || TimingSlot::Started {
            handle: self.group.begin(operation),
            faulted: false,
        });
        if inserted {
            debug!(%exchange, operation, "timing started");
        } else {
            debug!(%exchange, operation, "duplicate begin ignored");
        }
    }

    /// Close the measurement for an exchange.
    ///
    /// The outcome is `Error` when `is_fault` is set or the exchange
    /// carries a fault marker, else `Success`. From `New` or `Ended` this
    /// is a silent no-op, so malformed or duplicate frame sequences never
    /// crash or double-record.
    pub fn end(&self, exchange: ExchangeId, is_fault: bool) {
        let Some(mut slot) = self.slots.get_mut(&exchange) else {
            return;
        };
        if let TimingSlot::Started { handle, faulted } =
            std::mem::replace(&mut *slot, TimingSlot::Ended)
        {
            drop(slot);
            let error = is_fault || faulted;
            debug!(%exchange, error, "timing ended");
            if error {
                handle.end_with_error();
            } else {
                handle.end_with_success();
            }
        }
    }

    /// Record a fault marker on a started exchange without closing it.
    ///
    /// The marker takes precedence at close: a later `end(exchange, false)`
    /// still records an error outcome. Used when the close itself is
    /// deferred, as for faults on one-way outbound sends.
    pub fn mark_fault(&self, exchange: ExchangeId) {
        if let Some(mut slot) = self.slots.get_mut(&exchange) {
            if let TimingSlot::Started { faulted, .. } = &mut *slot {
                *faulted = true;
                debug!(%exchange, "fault marked");
            }
        }
    }

    /// Drop the exchange's slot.
    ///
    /// Called by the host when it disposes of the exchange; a still-running
    /// handle is discarded without recording (abandoned call).
    pub fn discard(&self, exchange: ExchangeId) {
        self.slots.remove(&exchange);
    }

    /// Observable state of an exchange.
    pub fn state(&self, exchange: ExchangeId) -> TimingState {
        match self.slots.get_mut(&exchange).as_deref() {
            None => TimingState::New,
            Some(TimingSlot::Started { .. }) => TimingState::Started,
            Some(TimingSlot::Ended) => TimingState::Ended,
        }
    }

    /// The group measurements are recorded through.
    pub fn group(&self) -> &TimedGroup {
        &self.group
    }

    /// Number of exchanges currently tracked (started or ended).
    pub fn tracked(&self) -> usize {
        self.slots.len()
    }
}
