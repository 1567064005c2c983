//! Late-pipeline closing stage for one-way calls.
//!
//! A one-way call produces no response frame, so nothing on the normal
//! path would ever close its timer. When the outbound stage sees a
//! one-way request leave the client, it registers a [`ClosingStage`] with
//! the host's [`CloseRegistrar`]; the host runs it at the very last
//! pipeline step, once the frame counts as fully dispatched.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::correlate::TimingCorrelator;
use crate::exchange::ExchangeId;

/// Closes one exchange's timer at the end of the outbound pipeline.
///
/// A plain value: the correlator plus the exchange it closes. `run` is
/// unconditional and safe to call on an already-ended exchange.
pub struct ClosingStage {
    correlator: Arc<TimingCorrelator>,
    exchange: ExchangeId,
}

impl ClosingStage {
    /// Create a closing stage for one exchange.
    pub fn new(correlator: Arc<TimingCorrelator>, exchange: ExchangeId) -> Self {
        Self {
            correlator,
            exchange,
        }
    }

    /// The exchange this stage closes.
    #[inline]
    pub fn exchange(&self) -> ExchangeId {
        self.exchange
    }

    /// Close the timer.
    ///
    /// Passes a non-fault close; a fault marker set earlier on the
    /// exchange still yields an error outcome.
    pub fn run(&self) {
        debug!(exchange = %self.exchange, "late close");
        self.correlator.end(self.exchange, false);
    }
}

/// How the outbound stage hands closing stages to the host pipeline.
///
/// The host invokes every registered stage at its designated final
/// outbound step.
pub trait CloseRegistrar {
    /// Register a closing stage to run at the final pipeline step.
    fn register_close(&self, stage: ClosingStage);
}

/// Simple registrar that queues stages until the host drains them.
#[derive(Default)]
pub struct CloseQueue {
    stages: Mutex<Vec<ClosingStage>>,
}

impl CloseQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stages waiting to run.
    pub fn len(&self) -> usize {
        self.stages.lock().len()
    }

    /// Check whether any stages are waiting.
    pub fn is_empty(&self) -> bool {
        self.stages.lock().is_empty()
    }

    /// Run and drop every queued stage, returning how many ran.
    pub fn run_all(&self) -> usize {
        let stages: Vec<_> = self.stages.lock().drain(..).collect();
        let ran = stages.len();
        for stage in stages {
            stage.run();
        }
        ran
    }
}

impl CloseRegistrar for CloseQueue {
    fn register_close(&self, stage: ClosingStage) {
        self.stages.lock().push(stage);
    }
}
