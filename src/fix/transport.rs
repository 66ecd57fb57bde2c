//! FIX implementation of the order transport contract.
//!
//! Sends order operations as NewOrderSingle (D), OrderCancelRequest (F) and
//! OrderCancelReplaceRequest (G) messages and blocks the caller until the
//! tracker correlates the matching ExecutionReport, or the per-call deadline
//! expires. Cancel and amend calls carry only an exchange order id; the
//! original ClOrdID, symbol and wire side are recovered from the tracker's
//! reverse map and the cached pending entry. An order this process never
//! placed cannot be canceled here and fails as `UnknownOrder` without any
//! wire traffic.

use crate::core::{AmendOrderRequest, CreateOrderRequest, Order, TransportError};
use crate::engine::OutboundMessage;
use crate::fix::mapper;
use crate::fix::pending::{Instrument, PendingRequest};
use crate::fix::session::FixSessionManager;
use crate::fix::tracker::FixOrderStateTracker;
use crate::transport::{OrderTransport, TransportKind};
use crate::utils::TransportMetrics;
use crossbeam::channel::RecvTimeoutError;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

pub struct FixOrderTransport {
    session_manager: Arc<FixSessionManager>,
    tracker: Arc<FixOrderStateTracker>,
    order_timeout: Duration,
    metrics: Arc<TransportMetrics>,
}

impl FixOrderTransport {
    pub fn new(
        session_manager: Arc<FixSessionManager>,
        tracker: Arc<FixOrderStateTracker>,
        order_timeout: Duration,
    ) -> Self {
        Self {
            session_manager,
            tracker,
            order_timeout,
            metrics: Arc::new(TransportMetrics::new()),
        }
    }

    pub fn metrics(&self) -> Arc<TransportMetrics> {
        Arc::clone(&self.metrics)
    }

    fn validate_create(request: &CreateOrderRequest) -> Result<(), TransportError> {
        if request.count <= 0 {
            return Err(TransportError::rejected(format!(
                "count must be positive, got {}",
                request.count
            )));
        }
        if request.yes_price.is_none() && request.no_price.is_none() {
            return Err(TransportError::rejected(
                "either yes_price or no_price is required",
            ));
        }
        for price in [request.yes_price, request.no_price].into_iter().flatten() {
            if !(1..=99).contains(&price) {
                return Err(TransportError::rejected(format!(
                    "price {} outside the 1-99 cent range",
                    price
                )));
            }
        }
        Ok(())
    }

    /// Claim an outbound slot; on failure the freshly registered pending
    /// entry is discarded so it cannot linger until the stale sweep.
    fn claim_slot(&self, msg_type: &str, cl_ord_id: &str) -> Result<OutboundMessage, TransportError> {
        let session = match self.session_manager.session() {
            Some(session) => session,
            None => {
                self.tracker.discard_pending(cl_ord_id);
                self.metrics.record_unavailable();
                return Err(TransportError::unavailable("FIX session not available"));
            }
        };
        match OutboundMessage::claim(session, msg_type) {
            Some(slot) => Ok(slot),
            None => {
                self.tracker.discard_pending(cl_ord_id);
                self.metrics.record_unavailable();
                Err(TransportError::Unavailable(format!(
                    "failed to claim outbound slot for MsgType {}",
                    msg_type
                )))
            }
        }
    }

    fn commit_slot(&self, slot: OutboundMessage, cl_ord_id: &str) -> Result<(), TransportError> {
        let msg_type = slot.msg_type().to_string();
        if let Err(e) = slot.commit() {
            // The guard aborted the claim on the failed commit.
            self.tracker.discard_pending(cl_ord_id);
            self.metrics.record_unavailable();
            return Err(TransportError::Unavailable(format!(
                "failed to commit MsgType {}: {}",
                msg_type, e
            )));
        }
        Ok(())
    }

    /// Recover the original ClOrdID and cached instrument details for a
    /// cancel/amend targeting `order_id`.
    fn resolve_original(
        &self,
        order_id: &str,
        operation: &str,
    ) -> Result<(String, String, char), TransportError> {
        let orig_cl_ord_id = match self.tracker.cl_ord_id_for_order_id(order_id) {
            Some(cl) => cl,
            None => {
                return Err(TransportError::UnknownOrder(format!(
                    "unknown order id for {}: {} (not placed via this FIX session)",
                    operation, order_id
                )))
            }
        };
        // The original pending entry may already be gone after a terminal
        // report; fall back to the defaults the wire schema tolerates.
        let (symbol, fix_side) = self
            .tracker
            .pending(&orig_cl_ord_id)
            .and_then(|p| p.instrument().cloned())
            .map(|i| (i.symbol, i.fix_side))
            .unwrap_or_else(|| (String::new(), mapper::SIDE_BUY));
        Ok((orig_cl_ord_id, symbol, fix_side))
    }

    fn await_response(
        &self,
        pending: &PendingRequest,
        operation: &str,
    ) -> Result<Order, TransportError> {
        let rx = match pending.take_receiver() {
            Some(rx) => rx,
            None => {
                return Err(TransportError::Interrupted(format!(
                    "FIX {} reply already consumed for ClOrdID {}",
                    operation,
                    pending.cl_ord_id()
                )))
            }
        };
        match rx.recv_timeout(self.order_timeout) {
            Ok(Ok(order)) => {
                self.metrics.record_ack();
                Ok(order)
            }
            Ok(Err(err)) => {
                if matches!(err, TransportError::Rejected(_)) {
                    self.metrics.record_reject();
                }
                Err(err)
            }
            Err(RecvTimeoutError::Timeout) => {
                // The pending entry stays for the stale sweep; a late report
                // will be routed to the update sink.
                self.metrics.record_timeout();
                Err(TransportError::Timeout(format!(
                    "FIX {} timeout after {:?} for ClOrdID {}",
                    operation,
                    self.order_timeout,
                    pending.cl_ord_id()
                )))
            }
            Err(RecvTimeoutError::Disconnected) => Err(TransportError::Interrupted(format!(
                "FIX {} abandoned for ClOrdID {}",
                operation,
                pending.cl_ord_id()
            ))),
        }
    }
}

impl OrderTransport for FixOrderTransport {
    fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, TransportError> {
        Self::validate_create(request)?;

        let cl_ord_id = request
            .client_order_id
            .clone()
            .unwrap_or_else(mapper::generate_cl_ord_id);

        let pending = self.tracker.register_pending(
            &cl_ord_id,
            Some(Instrument {
                fix_side: mapper::side_to_fix(request.action, request.side),
                symbol: request.ticker.clone(),
            }),
        );

        let mut slot = self.claim_slot("D", &cl_ord_id)?;
        if let Err(e) = mapper::populate_new_order(slot.body_mut(), request, &cl_ord_id) {
            drop(slot); // abort the claimed slot
            self.tracker.discard_pending(&cl_ord_id);
            self.metrics.record_unavailable();
            return Err(TransportError::Unavailable(format!(
                "failed to build NewOrderSingle: {}",
                e
            )));
        }
        self.commit_slot(slot, &cl_ord_id)?;
        self.metrics.record_create_sent();

        info!(
            cl_ord_id = %cl_ord_id,
            ticker = %request.ticker,
            action = %request.action,
            side = %request.side,
            count = request.count,
            "NewOrderSingle sent"
        );

        self.await_response(&pending, "create")
    }

    fn cancel_order(&self, order_id: &str) -> Result<Order, TransportError> {
        let (orig_cl_ord_id, symbol, fix_side) = self.resolve_original(order_id, "cancel")?;

        let cancel_cl_ord_id = mapper::generate_cl_ord_id();
        let pending = self.tracker.register_pending(&cancel_cl_ord_id, None);

        let mut slot = self.claim_slot("F", &cancel_cl_ord_id)?;
        mapper::populate_cancel_request(
            slot.body_mut(),
            &cancel_cl_ord_id,
            &orig_cl_ord_id,
            &symbol,
            fix_side,
        );
        self.commit_slot(slot, &cancel_cl_ord_id)?;
        self.metrics.record_cancel_sent();

        info!(
            cl_ord_id = %cancel_cl_ord_id,
            orig_cl_ord_id = %orig_cl_ord_id,
            order_id = %order_id,
            "OrderCancelRequest sent"
        );

        self.await_response(&pending, "cancel")
    }

    fn cancel_orders(&self, order_ids: &[String]) -> Result<(), TransportError> {
        for order_id in order_ids {
            if let Err(e) = self.cancel_order(order_id) {
                error!(order_id = %order_id, error = %e, "batch cancel entry failed");
            }
        }
        Ok(())
    }

    fn amend_order(
        &self,
        order_id: &str,
        request: &AmendOrderRequest,
    ) -> Result<Order, TransportError> {
        if request.is_empty() {
            return Err(TransportError::rejected(
                "amend request must set a price or a count",
            ));
        }
        for price in [request.yes_price, request.no_price].into_iter().flatten() {
            if !(1..=99).contains(&price) {
                return Err(TransportError::rejected(format!(
                    "price {} outside the 1-99 cent range",
                    price
                )));
            }
        }

        let (orig_cl_ord_id, symbol, fix_side) = self.resolve_original(order_id, "amend")?;

        // Project the amended price onto the wire's yes-leg convention using
        // the original order's side.
        let new_price = if let Some(yes) = request.yes_price {
            Some(if fix_side == mapper::SIDE_BUY { yes } else { 100 - yes })
        } else {
            request.no_price.map(|no| {
                if fix_side == mapper::SIDE_BUY {
                    100 - no
                } else {
                    no
                }
            })
        };

        let amend_cl_ord_id = mapper::generate_cl_ord_id();
        let pending = self.tracker.register_pending(&amend_cl_ord_id, None);

        let mut slot = self.claim_slot("G", &amend_cl_ord_id)?;
        mapper::populate_amend_request(
            slot.body_mut(),
            &amend_cl_ord_id,
            &orig_cl_ord_id,
            &symbol,
            fix_side,
            new_price,
            request.count,
        );
        self.commit_slot(slot, &amend_cl_ord_id)?;
        self.metrics.record_amend_sent();

        info!(
            cl_ord_id = %amend_cl_ord_id,
            orig_cl_ord_id = %orig_cl_ord_id,
            order_id = %order_id,
            "OrderCancelReplaceRequest sent"
        );

        self.await_response(&pending, "amend")
    }

    fn is_available(&self) -> bool {
        self.session_manager.is_logged_on()
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Fix
    }
}
