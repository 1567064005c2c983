//! Error types for pipetime.

use thiserror::Error;

use crate::exchange::ExchangeId;

/// Main error type for all pipetime operations.
///
/// None of these ever cross the pipeline boundary: the infallible stage
/// entry points log and swallow them. They are surfaced only through the
/// `try_handle` variants for hosts that route errors themselves.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipetimeError {
    /// The frame pass carries no exchange association.
    ///
    /// Expected for pipeline stages invoked outside a real call context;
    /// no measurement is recorded and nothing is logged.
    #[error("no exchange associated with frame pass")]
    NoExchange,

    /// A server-side start frame carried no resolvable operation identifier.
    ///
    /// The measurement is dropped rather than started under an empty name,
    /// so a misconfigured endpoint cannot corrupt the metrics namespace.
    #[error("missing operation identifier for exchange {0}")]
    MissingOperation(ExchangeId),
}

/// Result type alias using PipetimeError.
pub type Result<T> = std::result::Result<T, PipetimeError>;
