//! Outbound stage handler.
//!
//! Reacts to outbound frames: a request leaving a client starts the
//! timer, a response leaving a server ends it. A one-way request has no
//! response frame to end on, so this stage additionally registers a
//! [`ClosingStage`](super::ClosingStage) to run at the host's final
//! outbound step.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::correlate::TimingCorrelator;
use crate::error::{PipetimeError, Result};
use crate::frame::Frame;

use super::{CloseRegistrar, ClosingStage};

/// Handles outbound frame passes.
pub struct OutboundStage {
    correlator: Arc<TimingCorrelator>,
}

impl OutboundStage {
    /// Create an outbound stage driving `correlator`.
    pub fn new(correlator: Arc<TimingCorrelator>) -> Self {
        Self { correlator }
    }

    /// Handle an outbound frame pass.
    ///
    /// Never panics and never propagates an error into the host pipeline;
    /// reportable conditions are logged and the measurement is dropped.
    pub fn handle(&self, frame: &Frame, registrar: &dyn CloseRegistrar) {
        match self.try_handle(frame, registrar) {
            Ok(()) | Err(PipetimeError::NoExchange) => {}
            Err(err) => warn!(%err, "outbound timing pass dropped"),
        }
    }

    /// Handle an outbound frame pass, surfacing reportable conditions.
    pub fn try_handle(&self, frame: &Frame, registrar: &dyn CloseRegistrar) -> Result<()> {
        let exchange = frame.exchange().ok_or(PipetimeError::NoExchange)?;

        if frame.is_fault() {
            if frame.is_one_way() {
                // The late closing stage owns the close; mark the fault so
                // it still records an error outcome.
                self.correlator.mark_fault(exchange);
            } else {
                self.correlator.end(exchange, true);
            }
            return Ok(());
        }

        if frame.is_partial() {
            // Preliminary copy, not the final outcome.
            return Ok(());
        }

        if frame.is_originator() {
            if frame.is_one_way() {
                // No response frame will ever end this timer; hand the
                // close to the host's final pipeline step.
                debug!(%exchange, "registering late close for one-way send");
                registrar.register_close(ClosingStage::new(self.correlator.clone(), exchange));
            }
            // The request leaving the caller starts the measurement.
            let operation = frame
                .operation()
                .ok_or(PipetimeError::MissingOperation(exchange))?;
            self.correlator.begin(exchange, operation);
        } else {
            // The response leaving the callee ends it.
            self.correlator.end(exchange, false);
        }
        Ok(())
    }
}
