//! Stage module - pipeline handlers that drive the correlator.
//!
//! Provides:
//! - [`InboundStage`] - reacts to inbound frames (request arriving at a
//!   server, response arriving back at a client)
//! - [`OutboundStage`] - reacts to outbound frames (request leaving a
//!   client, response leaving a server) and registers the late closing
//!   stage for one-way sends
//! - [`ClosingStage`] - the late-pipeline close for one-way calls
//! - [`CloseRegistrar`] / [`CloseQueue`] - how the host runs closing
//!   stages at its designated final pipeline step
//!
//! Fault frames on either path close the timer with an error outcome;
//! the branching lives in the stages, the idempotence in the correlator.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use pipetime::correlate::TimingCorrelator;
//! use pipetime::exchange::ExchangeId;
//! use pipetime::frame::{Frame, Role};
//! use pipetime::metrics::{MetricRegistry, TimedGroup};
//! use pipetime::stage::{InboundStage, OutboundStage};
//!
//! let registry = Arc::new(MetricRegistry::new());
//! let correlator = Arc::new(TimingCorrelator::new(TimedGroup::new("svc", registry.clone())));
//! let inbound = InboundStage::new(correlator.clone());
//! let outbound = OutboundStage::new(correlator);
//!
//! // Server-side round trip: request in, response out.
//! let ex = ExchangeId::next();
//! inbound.handle(&Frame::request(ex, "echo"));
//! outbound.handle(&Frame::response(ex, Role::Receiver), &pipetime::stage::CloseQueue::new());
//!
//! assert_eq!(registry.stats("svc.echo").unwrap().successes, 1);
//! ```

mod closing;
mod inbound;
mod outbound;

pub use closing::{CloseQueue, CloseRegistrar, ClosingStage};
pub use inbound::InboundStage;
pub use outbound::OutboundStage;
