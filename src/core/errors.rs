//! Typed failures of the order-transport contract.
//!
//! Every internal failure inside a transport is converted to one of these
//! variants before it crosses the [`OrderTransport`](crate::transport::OrderTransport)
//! boundary; callers never see engine-level errors.

use std::fmt;

/// Failure modes of a transport operation.
///
/// `Unavailable` is the only class a fallback wrapper retries on its
/// secondary: the request never reached the exchange, so replaying it is
/// safe. Everything else is terminal for the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Session not logged on, outbound slot claim failed, or the engine
    /// failed while building or committing the message.
    Unavailable(String),

    /// The exchange refused the request (ExecutionReport ExecType=8 or an
    /// OrderCancelReject), or the request failed boundary validation.
    Rejected(String),

    /// Deadline expired without a correlated report. The request may still be
    /// live on the exchange.
    Timeout(String),

    /// Cancel/amend referenced an exchange order id this process never
    /// placed, so the original ClOrdID and instrument cannot be recovered.
    UnknownOrder(String),

    /// The in-flight request was abandoned before completion.
    Interrupted(String),
}

impl TransportError {
    /// True when a fallback wrapper may replay the call on its secondary.
    pub fn is_retriable(&self) -> bool {
        matches!(self, TransportError::Unavailable(_))
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        TransportError::Unavailable(msg.into())
    }

    pub fn rejected(msg: impl Into<String>) -> Self {
        TransportError::Rejected(msg.into())
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Unavailable(msg) => write!(f, "transport unavailable: {}", msg),
            TransportError::Rejected(msg) => write!(f, "rejected: {}", msg),
            TransportError::Timeout(msg) => write!(f, "timeout: {}", msg),
            TransportError::UnknownOrder(msg) => write!(f, "unknown order: {}", msg),
            TransportError::Interrupted(msg) => write!(f, "interrupted: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}
