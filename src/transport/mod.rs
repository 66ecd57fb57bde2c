//! Order transport abstraction.
//!
//! Every order mover implements [`OrderTransport`]; callers stay oblivious to
//! whether an operation traverses an HTTP request/response pair or the
//! persistent FIX session. Two implementations exist: the FIX transport
//! ([`crate::fix::FixOrderTransport`]) and whatever REST client the host
//! application supplies behind this trait. [`FallbackTransport`] composes the
//! two.

pub mod factory;
pub mod fallback;

pub use factory::{build_transport, FixTransportHandle};
pub use fallback::FallbackTransport;

use crate::core::{AmendOrderRequest, CreateOrderRequest, Order, TransportError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity tag for logging and diagnostics only; never branch business
/// logic on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Rest,
    Fix,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Rest => write!(f, "REST"),
            TransportKind::Fix => write!(f, "FIX"),
        }
    }
}

/// Contract every order mover implements.
///
/// `is_available()` returning true is necessary but not sufficient for
/// success: a call may still fail afterwards, so wrappers must also trap
/// per-call errors.
pub trait OrderTransport: Send + Sync {
    /// Place a new order and block until the exchange acknowledges it.
    fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, TransportError>;

    /// Cancel by exchange order id, returning the canceled terminal state.
    /// Fails with [`TransportError::UnknownOrder`] when this transport has no
    /// record of placing the order.
    fn cancel_order(&self, order_id: &str) -> Result<Order, TransportError>;

    /// Best-effort batch cancel. A FIX implementation loops per id and
    /// swallows individual failures; an HTTP implementation may batch on the
    /// wire (typically capped around 20 ids per request) and fail the whole
    /// batch atomically.
    fn cancel_orders(&self, order_ids: &[String]) -> Result<(), TransportError>;

    /// Modify a resting order's price and/or size.
    fn amend_order(
        &self,
        order_id: &str,
        request: &AmendOrderRequest,
    ) -> Result<Order, TransportError>;

    /// True iff the transport can accept a new request right now.
    fn is_available(&self) -> bool;

    fn kind(&self) -> TransportKind;
}
