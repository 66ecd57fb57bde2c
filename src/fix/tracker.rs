//! Order state tracker: correlates inbound ExecutionReports with in-flight
//! requests.
//!
//! Subscribes to the session's inbound message stream and owns two pieces of
//! process-local state:
//!
//! - the pending table, keyed by ClOrdID, holding one [`PendingRequest`] per
//!   in-flight operation, and
//! - the bidirectional ClOrdID↔exchange-order-id correlation maps, populated
//!   on the first report carrying both ids and never purged while the
//!   process lives (cancel/amend lookups must keep succeeding).
//!
//! Only the first report that is terminal for a request resolves its caller;
//! later reports with the same ClOrdID (fills after an ack, late replies
//! after a timeout) become sink updates instead. All methods here run on the
//! engine's inbound-message thread and must not block.

use crate::core::{Order, TransportError};
use crate::engine::{FixMessage, MessageListener};
use crate::fix::mapper;
use crate::fix::pending::{Completion, Instrument, PendingRequest};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Callback receiving post-acknowledgement order updates. Runs on the
/// inbound-message thread.
pub type OrderUpdateSink = Box<dyn Fn(&Order) + Send + Sync>;

pub struct FixOrderStateTracker {
    pending_by_cl_ord_id: DashMap<String, Arc<PendingRequest>>,
    cl_ord_id_to_order_id: DashMap<String, String>,
    order_id_to_cl_ord_id: DashMap<String, String>,
    update_sink: RwLock<Option<OrderUpdateSink>>,
    request_timeout: Duration,
}

impl FixOrderStateTracker {
    pub fn new(request_timeout: Duration) -> Self {
        Self {
            pending_by_cl_ord_id: DashMap::new(),
            cl_ord_id_to_order_id: DashMap::new(),
            order_id_to_cl_ord_id: DashMap::new(),
            update_sink: RwLock::new(None),
            request_timeout,
        }
    }

    /// Register the single post-ack update sink. Replaces any previous one.
    pub fn set_update_sink(&self, sink: OrderUpdateSink) {
        *self.update_sink.write() = Some(sink);
    }

    /// Register an in-flight request before its message is committed.
    pub fn register_pending(
        &self,
        cl_ord_id: &str,
        instrument: Option<Instrument>,
    ) -> Arc<PendingRequest> {
        let pending = Arc::new(PendingRequest::new(cl_ord_id, instrument));
        self.pending_by_cl_ord_id
            .insert(cl_ord_id.to_string(), Arc::clone(&pending));
        pending
    }

    /// Remove a pending entry whose message never made it onto the wire.
    pub fn discard_pending(&self, cl_ord_id: &str) {
        self.pending_by_cl_ord_id.remove(cl_ord_id);
    }

    /// Original ClOrdID for an exchange order id (cancel/amend correlation).
    pub fn cl_ord_id_for_order_id(&self, order_id: &str) -> Option<String> {
        self.order_id_to_cl_ord_id
            .get(order_id)
            .map(|entry| entry.value().clone())
    }

    /// Exchange order id for a ClOrdID, once acknowledged.
    pub fn order_id_for_cl_ord_id(&self, cl_ord_id: &str) -> Option<String> {
        self.cl_ord_id_to_order_id
            .get(cl_ord_id)
            .map(|entry| entry.value().clone())
    }

    /// Pending entry for a ClOrdID (cached side/symbol on cancel/amend).
    pub fn pending(&self, cl_ord_id: &str) -> Option<Arc<PendingRequest>> {
        self.pending_by_cl_ord_id
            .get(cl_ord_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn pending_count(&self) -> usize {
        self.pending_by_cl_ord_id.len()
    }

    /// Snapshot of the forward correlation map.
    pub fn order_id_mappings(&self) -> HashMap<String, String> {
        self.cl_ord_id_to_order_id
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Fail and drop pending entries older than the request timeout.
    ///
    /// Backstop behind the per-call deadline in the transport; meant to be
    /// driven by an external scheduler (once per second is plenty). Entries
    /// that already completed stay: they cache the instrument details that
    /// later cancel/amend requests need.
    pub fn cleanup_stale(&self) {
        self.pending_by_cl_ord_id.retain(|cl_ord_id, pending| {
            if pending.is_expired(self.request_timeout) && !pending.is_done() {
                warn!(cl_ord_id = %cl_ord_id, "timed out pending order request");
                let _ = pending.complete(Err(TransportError::Timeout(format!(
                    "no ExecutionReport within {:?} for ClOrdID {}",
                    self.request_timeout, cl_ord_id
                ))));
                false
            } else {
                true
            }
        });
    }

    // ==================== Inbound dispatch ====================

    fn handle_execution_report(&self, msg: &FixMessage) {
        let exec_type = match mapper::exec_type(msg) {
            Some(et) => et,
            None => {
                warn!("ExecutionReport without ExecType, ignoring");
                return;
            }
        };
        let cl_ord_id = msg.get_str(mapper::TAG_CL_ORD_ID);
        let order_id = msg.get_str(mapper::TAG_ORDER_ID);

        debug!(
            exec_type = %exec_type,
            cl_ord_id = cl_ord_id.unwrap_or("-"),
            order_id = order_id.unwrap_or("-"),
            "ExecutionReport"
        );

        if let (Some(cl), Some(oid)) = (cl_ord_id, order_id) {
            self.cl_ord_id_to_order_id
                .insert(cl.to_string(), oid.to_string());
            self.order_id_to_cl_ord_id
                .insert(oid.to_string(), cl.to_string());
        }

        let order = mapper::parse_execution_report(msg);

        // Pending lookup: by ClOrdID first, then by OrigClOrdID for
        // cancel/replace acks that rotate the ClOrdID.
        let pending = cl_ord_id
            .and_then(|cl| self.pending(cl))
            .or_else(|| {
                msg.get_str(mapper::TAG_ORIG_CL_ORD_ID)
                    .and_then(|orig| self.pending(orig))
            });

        match exec_type {
            mapper::EXEC_TYPE_NEW | mapper::EXEC_TYPE_PENDING_NEW => {
                if let Some(pending) = pending {
                    if let Some(oid) = order_id {
                        pending.set_order_id(oid);
                    }
                    match pending.complete(Ok(order)) {
                        Completion::Delivered => {
                            info!(
                                cl_ord_id = cl_ord_id.unwrap_or("-"),
                                order_id = order_id.unwrap_or("-"),
                                "order acknowledged"
                            );
                        }
                        Completion::AlreadyDone => {}
                        Completion::Abandoned(_) => {
                            debug!(
                                cl_ord_id = cl_ord_id.unwrap_or("-"),
                                "ack for abandoned request"
                            );
                        }
                    }
                }
            }

            mapper::EXEC_TYPE_REJECTED => {
                let reason = mapper::rejection_reason(msg);
                if let Some(pending) = pending {
                    let outcome = pending.complete(Err(TransportError::Rejected(format!(
                        "Order rejected: {}",
                        reason
                    ))));
                    if !matches!(outcome, Completion::AlreadyDone) {
                        self.pending_by_cl_ord_id.remove(pending.cl_ord_id());
                    }
                    warn!(
                        cl_ord_id = pending.cl_ord_id(),
                        reason = %reason,
                        "order rejected"
                    );
                }
            }

            mapper::EXEC_TYPE_TRADE | mapper::EXEC_TYPE_FILL | mapper::EXEC_TYPE_PARTIAL_FILL => {
                info!(
                    cl_ord_id = cl_ord_id.unwrap_or("-"),
                    order_id = order_id.unwrap_or("-"),
                    cum_qty = order.fill_count,
                    "fill"
                );
                match pending {
                    Some(pending) => match pending.complete(Ok(order.clone())) {
                        Completion::Delivered => {}
                        // Post-ack (or post-timeout) fill: route to the sink.
                        Completion::AlreadyDone | Completion::Abandoned(_) => {
                            self.fire_update(&order)
                        }
                    },
                    None => self.fire_update(&order),
                }
            }

            mapper::EXEC_TYPE_CANCELED | mapper::EXEC_TYPE_REPLACED | mapper::EXEC_TYPE_EXPIRED => {
                info!(
                    exec_type = %exec_type,
                    cl_ord_id = cl_ord_id.unwrap_or("-"),
                    order_id = order_id.unwrap_or("-"),
                    "order state change"
                );
                match pending {
                    Some(pending) => match pending.complete(Ok(order.clone())) {
                        Completion::Delivered => {
                            self.pending_by_cl_ord_id.remove(pending.cl_ord_id());
                        }
                        Completion::Abandoned(_) => {
                            self.pending_by_cl_ord_id.remove(pending.cl_ord_id());
                            self.fire_update(&order);
                        }
                        Completion::AlreadyDone => self.fire_update(&order),
                    },
                    None => self.fire_update(&order),
                }
            }

            other => {
                debug!(exec_type = %other, "unhandled ExecType");
            }
        }
    }

    fn handle_order_cancel_reject(&self, msg: &FixMessage) {
        let cl_ord_id = msg.get_str(mapper::TAG_CL_ORD_ID);
        let text = msg.get_str(mapper::TAG_TEXT).unwrap_or("Cancel rejected");

        warn!(
            cl_ord_id = cl_ord_id.unwrap_or("-"),
            text = %text,
            "OrderCancelReject"
        );

        let removed = cl_ord_id.and_then(|cl| self.pending_by_cl_ord_id.remove(cl));
        if let Some((_, pending)) = removed {
            let _ = pending.complete(Err(TransportError::Rejected(format!(
                "Cancel/amend rejected: {}",
                text
            ))));
        }
    }

    fn fire_update(&self, order: &Order) {
        let sink = self.update_sink.read();
        if let Some(sink) = sink.as_ref() {
            if catch_unwind(AssertUnwindSafe(|| sink(order))).is_err() {
                warn!(
                    order_id = %order.order_id,
                    "order update sink panicked"
                );
            }
        }
    }
}

impl MessageListener for FixOrderStateTracker {
    fn on_message(&self, msg: &FixMessage) {
        match msg.msg_type() {
            "8" => self.handle_execution_report(msg),
            "9" => self.handle_order_cancel_reject(msg),
            other => debug!(msg_type = %other, "ignoring message type"),
        }
    }

    fn on_session_reject(&self, ref_seq_num: u64, ref_msg_type: &str, reason: i32, text: &str) {
        warn!(
            ref_seq_num,
            ref_msg_type, reason, text, "FIX session-level reject"
        );
    }

    fn on_business_reject(&self, ref_seq_num: u64, reason: i32, text: &str) {
        warn!(ref_seq_num, reason, text, "FIX business reject");
    }
}
