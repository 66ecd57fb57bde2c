//! Transport composition that degrades from a primary to a secondary.
//!
//! The primary (FIX) is used whenever it reports available; a failure that
//! never reached the exchange (`TransportError::is_retriable`) is replayed on
//! the secondary exactly once. Failures the exchange itself produced
//! (rejections, timeouts, unknown orders) propagate untouched: replaying a
//! rejected order over HTTP would resubmit semantics the venue already
//! refused.

use crate::core::{AmendOrderRequest, CreateOrderRequest, Order, TransportError};
use crate::transport::{OrderTransport, TransportKind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;

pub struct FallbackTransport {
    primary: Arc<dyn OrderTransport>,
    secondary: Arc<dyn OrderTransport>,
    fallback_count: AtomicU64,
}

impl FallbackTransport {
    pub fn new(primary: Arc<dyn OrderTransport>, secondary: Arc<dyn OrderTransport>) -> Self {
        Self {
            primary,
            secondary,
            fallback_count: AtomicU64::new(0),
        }
    }

    /// How often a call degraded to the secondary.
    pub fn fallback_count(&self) -> u64 {
        self.fallback_count.load(Ordering::Relaxed)
    }

    fn call<T>(
        &self,
        operation: &str,
        call: impl Fn(&dyn OrderTransport) -> Result<T, TransportError>,
    ) -> Result<T, TransportError> {
        if self.primary.is_available() {
            match call(self.primary.as_ref()) {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retriable() => {
                    warn!(
                        operation,
                        error = %err,
                        "primary transport failed, falling back"
                    );
                }
                Err(err) => return Err(err),
            }
        } else {
            warn!(operation, "primary transport unavailable, using secondary");
        }
        self.fallback_count.fetch_add(1, Ordering::Relaxed);
        call(self.secondary.as_ref())
    }
}

impl OrderTransport for FallbackTransport {
    fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, TransportError> {
        self.call("create_order", |t| t.create_order(request))
    }

    fn cancel_order(&self, order_id: &str) -> Result<Order, TransportError> {
        self.call("cancel_order", |t| t.cancel_order(order_id))
    }

    fn cancel_orders(&self, order_ids: &[String]) -> Result<(), TransportError> {
        self.call("cancel_orders", |t| t.cancel_orders(order_ids))
    }

    fn amend_order(
        &self,
        order_id: &str,
        request: &AmendOrderRequest,
    ) -> Result<Order, TransportError> {
        self.call("amend_order", |t| t.amend_order(order_id, request))
    }

    fn is_available(&self) -> bool {
        self.primary.is_available() || self.secondary.is_available()
    }

    /// Reports whichever transport would serve a call made right now.
    fn kind(&self) -> TransportKind {
        if self.primary.is_available() {
            self.primary.kind()
        } else {
            self.secondary.kind()
        }
    }
}
