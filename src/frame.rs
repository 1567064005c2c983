//! Frame classification for pipeline passes.
//!
//! A [`Frame`] is one message pass through the pipeline: transient, built by
//! the host for the pass and dropped afterwards. It carries the attributes
//! the timing stages branch on, packed into a single flags byte:
//!
//! ```text
//! ┌───────────┬─────────┬───────┬─────────┐
//! │ ORIGINATOR│ ONE_WAY │ FAULT │ PARTIAL │
//! │ bit 0     │ bit 1   │ bit 2 │ bit 3   │
//! └───────────┴─────────┴───────┴─────────┘
//! ```
//!
//! plus an optional exchange association and an optional operation
//! identifier (present on the first inbound request frame of a server-side
//! call, or supplied by the host on a client-side outbound request).
//!
//! # Example
//!
//! ```
//! use pipetime::exchange::ExchangeId;
//! use pipetime::frame::{Frame, Role};
//!
//! let ex = ExchangeId::next();
//! let frame = Frame::request(ex, "echo");
//!
//! assert_eq!(frame.role(), Role::Receiver);
//! assert_eq!(frame.operation(), Some("echo"));
//! assert!(!frame.is_fault());
//! ```

use crate::exchange::ExchangeId;

/// Flag constants for frame classification.
pub mod flags {
    /// Role: originator/caller (1) or receiver/callee (0).
    pub const ORIGINATOR_ROLE: u8 = 0b0000_0001;
    /// One-way: no response frame expected (1).
    pub const ONE_WAY: u8 = 0b0000_0010;
    /// Fault: this pass is a fault dispatch (1).
    pub const FAULT: u8 = 0b0000_0100;
    /// Partial: duplicate/preliminary copy, not the final outcome (1).
    pub const PARTIAL: u8 = 0b0000_1000;

    /// Reserved bits mask (bits 4-7).
    pub const RESERVED_MASK: u8 = 0b1111_0000;

    /// Check if a specific flag is set.
    #[inline]
    pub fn has_flag(flags: u8, flag: u8) -> bool {
        flags & flag != 0
    }
}

/// Which side of the call this frame pass belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The caller side (the original requestor).
    Originator,
    /// The callee side (the service handling the request).
    Receiver,
}

/// One message pass through the pipeline.
///
/// Frames are transient; they are never persisted beyond the pass that
/// produces them. Cloning is cheap apart from the operation string.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Classification flags (see the [`flags`] module).
    flags: u8,
    /// The logical call this pass belongs to, if any.
    exchange: Option<ExchangeId>,
    /// Declared operation identifier, if the host resolved one.
    operation: Option<String>,
}

impl Frame {
    /// Create a frame from raw parts.
    pub fn new(flags: u8, exchange: Option<ExchangeId>, operation: Option<String>) -> Self {
        Self {
            flags,
            exchange,
            operation,
        }
    }

    /// An inbound request arriving at a server (role = receiver).
    pub fn request(exchange: ExchangeId, operation: &str) -> Self {
        Self::new(0, Some(exchange), Some(operation.to_string()))
    }

    /// An outbound request leaving a client (role = originator).
    pub fn client_request(exchange: ExchangeId, operation: &str) -> Self {
        Self::new(flags::ORIGINATOR_ROLE, Some(exchange), Some(operation.to_string()))
    }

    /// A response frame for the given role.
    pub fn response(exchange: ExchangeId, role: Role) -> Self {
        let bits = match role {
            Role::Originator => flags::ORIGINATOR_ROLE,
            Role::Receiver => 0,
        };
        Self::new(bits, Some(exchange), None)
    }

    /// A fault frame for the given role.
    pub fn fault(exchange: ExchangeId, role: Role) -> Self {
        let mut frame = Self::response(exchange, role);
        frame.flags |= flags::FAULT;
        frame
    }

    /// A frame pass with no exchange association.
    pub fn detached(flags: u8) -> Self {
        Self::new(flags, None, None)
    }

    /// Mark this frame as one-way.
    pub fn one_way(mut self) -> Self {
        self.flags |= flags::ONE_WAY;
        self
    }

    /// Mark this frame as a partial/preliminary copy.
    pub fn partial(mut self) -> Self {
        self.flags |= flags::PARTIAL;
        self
    }

    /// Get the flags byte.
    #[inline]
    pub fn flags(&self) -> u8 {
        self.flags
    }

    /// Get the exchange this pass belongs to, if any.
    #[inline]
    pub fn exchange(&self) -> Option<ExchangeId> {
        self.exchange
    }

    /// Get the declared operation identifier, if any.
    ///
    /// Empty identifiers count as absent so a blank field can never name
    /// a metric.
    pub fn operation(&self) -> Option<&str> {
        self.operation.as_deref().filter(|op| !op.is_empty())
    }

    /// Which side of the call this pass belongs to.
    #[inline]
    pub fn role(&self) -> Role {
        if flags::has_flag(self.flags, flags::ORIGINATOR_ROLE) {
            Role::Originator
        } else {
            Role::Receiver
        }
    }

    /// Check if this pass belongs to the caller side.
    #[inline]
    pub fn is_originator(&self) -> bool {
        self.role() == Role::Originator
    }

    /// Check if the call expects no response frame.
    #[inline]
    pub fn is_one_way(&self) -> bool {
        flags::has_flag(self.flags, flags::ONE_WAY)
    }

    /// Check if this pass is a fault dispatch.
    #[inline]
    pub fn is_fault(&self) -> bool {
        flags::has_flag(self.flags, flags::FAULT)
    }

    /// Check if this is a duplicate/preliminary copy.
    #[inline]
    pub fn is_partial(&self) -> bool {
        flags::has_flag(self.flags, flags::PARTIAL)
    }
}
