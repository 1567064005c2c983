//! # pipetime
//!
//! Response-time instrumentation core for bidirectional frame pipelines.
//!
//! Pipelines process inbound and outbound frames as independent passes,
//! possibly on different threads, with no built-in notion of which passes
//! belong to the same logical call. This crate reconstructs that
//! correlation so one elapsed-time and success/fault measurement is
//! recorded exactly once per call, whatever the role (caller vs callee)
//! or message shape (request/response vs fire-and-forget).
//!
//! ## Architecture
//!
//! - **Exchange store**: explicit map from call identity to per-call state
//! - **Correlator**: the `New -> Started -> Ended` state machine, idempotent
//!   in both directions against duplicate and partial frames
//! - **Stages**: inbound/outbound handlers the host pipeline invokes per
//!   pass, plus a late closing stage for one-way sends
//! - **Metrics**: timing handles recording into an opaque sink
//!
//! The host owns the transport, the pipeline, and the disposal of
//! exchanges; this crate never blocks, never spawns, and never lets an
//! error escape into the host's frame processing.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use pipetime::correlate::TimingCorrelator;
//! use pipetime::exchange::ExchangeId;
//! use pipetime::frame::{Frame, Role};
//! use pipetime::metrics::{MetricRegistry, TimedGroup};
//! use pipetime::stage::{CloseQueue, InboundStage, OutboundStage};
//!
//! let registry = Arc::new(MetricRegistry::new());
//! let correlator = Arc::new(TimingCorrelator::new(TimedGroup::new("svc", registry.clone())));
//! let inbound = InboundStage::new(correlator.clone());
//! let outbound = OutboundStage::new(correlator);
//! let closes = CloseQueue::new();
//!
//! // Client-side synchronous call: request out, response in.
//! let ex = ExchangeId::next();
//! outbound.handle(&Frame::client_request(ex, "echo"), &closes);
//! inbound.handle(&Frame::response(ex, Role::Originator));
//!
//! assert_eq!(registry.stats("svc.echo").unwrap().successes, 1);
//! ```

pub mod correlate;
pub mod error;
pub mod exchange;
pub mod frame;
pub mod metrics;
pub mod stage;

pub use correlate::{TimingCorrelator, TimingState};
pub use error::PipetimeError;
pub use exchange::{ExchangeId, ExchangeStore};
pub use frame::{Frame, Role};
pub use metrics::{MetricRegistry, MetricSink, Outcome, TimedGroup, TimingHandle};
pub use stage::{CloseQueue, CloseRegistrar, ClosingStage, InboundStage, OutboundStage};
