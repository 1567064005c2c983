//! Inbound stage handler.
//!
//! Reacts to inbound frames: a request arriving at a server starts the
//! timer, a response arriving back at a client ends it, a fault frame
//! closes it with an error outcome.

use std::sync::Arc;

use tracing::{trace, warn};

use crate::correlate::TimingCorrelator;
use crate::error::{PipetimeError, Result};
use crate::frame::Frame;

/// Handles inbound frame passes.
pub struct InboundStage {
    correlator: Arc<TimingCorrelator>,
}

impl InboundStage {
    /// Create an inbound stage driving `correlator`.
    pub fn new(correlator: Arc<TimingCorrelator>) -> Self {
        Self { correlator }
    }

    /// Handle an inbound frame pass.
    ///
    /// Never panics and never propagates an error into the host pipeline;
    /// reportable conditions are logged and the measurement is dropped.
    pub fn handle(&self, frame: &Frame) {
        match self.try_handle(frame) {
            Ok(()) | Err(PipetimeError::NoExchange) => {}
            Err(err) => warn!(%err, "inbound timing pass dropped"),
        }
    }

    /// Handle an inbound frame pass, surfacing reportable conditions.
    pub fn try_handle(&self, frame: &Frame) -> Result<()> {
        let exchange = frame.exchange().ok_or(PipetimeError::NoExchange)?;

        if frame.is_fault() {
            // Fault dispatch closes immediately, whichever path delivers
            // it first.
            self.correlator.end(exchange, true);
            return Ok(());
        }

        if frame.is_originator() {
            if frame.is_one_way() {
                // One-way calls receive no inbound frame of interest;
                // anything arriving here is spurious for timing.
                trace!(%exchange, "spurious inbound frame on one-way call");
            } else {
                // The response arriving back at the caller.
                self.correlator.end(exchange, false);
            }
            return Ok(());
        }

        // A request arriving at the server starts the measurement.
        let operation = frame
            .operation()
            .ok_or(PipetimeError::MissingOperation(exchange))?;
        self.correlator.begin(exchange, operation);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlate::TimingState;
    use crate::exchange::ExchangeId;
    use crate::frame::Role;
    use crate::metrics::{MetricRegistry, TimedGroup};

    fn stage() -> (Arc<MetricRegistry>, Arc<TimingCorrelator>, InboundStage) {
        let registry = Arc::new(MetricRegistry::new());
        let correlator = Arc::new(TimingCorrelator::new(TimedGroup::new(
            "svc",
            registry.clone(),
        )));
        (registry.clone(), correlator.clone(), InboundStage::new(correlator))
    }

    #[test]
    fn test_server_request_starts_timer() {
        let (_, correlator, stage) = stage();
        let ex = ExchangeId::next();

        stage.handle(&Frame::request(ex, "echo"));
        assert_eq!(correlator.state(ex), TimingState::Started);
    }

    #[test]
    fn test_client_response_ends_timer() {
        let (registry, correlator, stage) = stage();
        let ex = ExchangeId::next();

        correlator.begin(ex, "echo");
        stage.handle(&Frame::response(ex, Role::Originator));

        assert_eq!(correlator.state(ex), TimingState::Ended);
        assert_eq!(registry.stats("svc.echo").unwrap().successes, 1);
    }

    #[test]
    fn test_one_way_inbound_is_ignored() {
        let (registry, correlator, stage) = stage();
        let ex = ExchangeId::next();

        correlator.begin(ex, "notify");
        stage.handle(&Frame::response(ex, Role::Originator).one_way());

        // Spurious frame; the late closing stage owns this close.
        assert_eq!(correlator.state(ex), TimingState::Started);
        assert_eq!(registry.operation_count(), 0);
    }

    #[test]
    fn test_fault_ends_with_error() {
        let (registry, correlator, stage) = stage();
        let ex = ExchangeId::next();

        correlator.begin(ex, "echo");
        stage.handle(&Frame::fault(ex, Role::Originator));

        assert_eq!(registry.stats("svc.echo").unwrap().errors, 1);
    }

    #[test]
    fn test_missing_operation_drops_measurement() {
        let (registry, correlator, stage) = stage();
        let ex = ExchangeId::next();

        let frame = Frame::response(ex, Role::Receiver); // no operation field
        assert_eq!(
            stage.try_handle(&frame),
            Err(PipetimeError::MissingOperation(ex))
        );

        // The infallible entry point swallows it too.
        stage.handle(&frame);
        assert_eq!(correlator.state(ex), TimingState::New);
        assert_eq!(registry.operation_count(), 0);
    }

    #[test]
    fn test_no_exchange_is_silent() {
        let (registry, _, stage) = stage();
        let frame = Frame::detached(0);

        assert_eq!(stage.try_handle(&frame), Err(PipetimeError::NoExchange));
        stage.handle(&frame);
        assert_eq!(registry.operation_count(), 0);
    }
}
