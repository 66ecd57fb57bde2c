//! In-flight request state awaiting an ExecutionReport.

use crate::core::{Order, TransportError};
use crossbeam::channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// What a completed request resolves to.
pub type OrderReply = Result<Order, TransportError>;

/// Original-order details cached at send time. FIX cancel/amend messages must
/// carry Symbol and Side even though the caller supplies only an exchange
/// order id, and the tracker cannot reconstruct them from that id alone.
#[derive(Debug, Clone)]
pub struct Instrument {
    pub fix_side: char,
    pub symbol: String,
}

/// Outcome of a completion attempt.
#[derive(Debug)]
pub enum Completion {
    /// The waiting caller received the reply.
    Delivered,
    /// A reply was already delivered; this one is a duplicate.
    AlreadyDone,
    /// The caller stopped waiting before the reply arrived.
    Abandoned(OrderReply),
}

/// One in-flight operation keyed by ClOrdID.
///
/// The completion primitive is a single-slot channel whose sender is consumed
/// by the first completion; racing reports after that observe `AlreadyDone`
/// or `Abandoned` and never double-complete.
pub struct PendingRequest {
    cl_ord_id: String,
    created_at: Instant,
    tx: Mutex<Option<Sender<OrderReply>>>,
    rx: Mutex<Option<Receiver<OrderReply>>>,
    order_id: Mutex<Option<String>>,
    instrument: Option<Instrument>,
}

impl PendingRequest {
    pub fn new(cl_ord_id: &str, instrument: Option<Instrument>) -> Self {
        let (tx, rx) = bounded(1);
        Self {
            cl_ord_id: cl_ord_id.to_string(),
            created_at: Instant::now(),
            tx: Mutex::new(Some(tx)),
            rx: Mutex::new(Some(rx)),
            order_id: Mutex::new(None),
            instrument,
        }
    }

    pub fn cl_ord_id(&self) -> &str {
        &self.cl_ord_id
    }

    pub fn instrument(&self) -> Option<&Instrument> {
        self.instrument.as_ref()
    }

    /// Exchange order id once the first report carrying one has been seen.
    pub fn order_id(&self) -> Option<String> {
        self.order_id.lock().clone()
    }

    pub fn set_order_id(&self, order_id: &str) {
        *self.order_id.lock() = Some(order_id.to_string());
    }

    /// Hand the receive side to the awaiting caller. Each request has exactly
    /// one awaiter; a second take returns `None`.
    pub fn take_receiver(&self) -> Option<Receiver<OrderReply>> {
        self.rx.lock().take()
    }

    /// Deliver a reply. First completion wins; the sender is consumed
    /// atomically so concurrent reports cannot both deliver.
    pub fn complete(&self, reply: OrderReply) -> Completion {
        let tx = self.tx.lock().take();
        match tx {
            None => Completion::AlreadyDone,
            Some(tx) => match tx.send(reply) {
                Ok(()) => Completion::Delivered,
                Err(err) => Completion::Abandoned(err.into_inner()),
            },
        }
    }

    /// True once a completion has been delivered (or attempted against an
    /// abandoned caller).
    pub fn is_done(&self) -> bool {
        self.tx.lock().is_none()
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    pub fn is_expired(&self, timeout: Duration) -> bool {
        self.age() > timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::OrderStatus;

    fn order(cl_ord_id: &str) -> Order {
        Order {
            client_order_id: cl_ord_id.to_string(),
            status: OrderStatus::Resting,
            ..Default::default()
        }
    }

    #[test]
    fn test_first_completion_wins() {
        let pending = PendingRequest::new("cl-1", None);
        let rx = pending.take_receiver().unwrap();

        assert!(!pending.is_done());
        assert!(matches!(
            pending.complete(Ok(order("cl-1"))),
            Completion::Delivered
        ));
        assert!(pending.is_done());
        assert!(matches!(
            pending.complete(Ok(order("cl-1"))),
            Completion::AlreadyDone
        ));

        let reply = rx.recv_timeout(Duration::from_millis(100)).unwrap();
        assert_eq!(reply.unwrap().client_order_id, "cl-1");
    }

    #[test]
    fn test_abandoned_caller_returns_reply() {
        let pending = PendingRequest::new("cl-2", None);
        drop(pending.take_receiver().unwrap());

        match pending.complete(Ok(order("cl-2"))) {
            Completion::Abandoned(Ok(o)) => assert_eq!(o.client_order_id, "cl-2"),
            other => panic!("expected Abandoned, got {:?}", other),
        }
        assert!(pending.is_done());
    }

    #[test]
    fn test_receiver_taken_once() {
        let pending = PendingRequest::new("cl-3", None);
        assert!(pending.take_receiver().is_some());
        assert!(pending.take_receiver().is_none());
    }

    #[test]
    fn test_expiry() {
        let pending = PendingRequest::new("cl-4", None);
        assert!(!pending.is_expired(Duration::from_secs(5)));
        std::thread::sleep(Duration::from_millis(2));
        assert!(pending.is_expired(Duration::from_millis(1)));
    }

    #[test]
    fn test_cached_instrument() {
        let pending = PendingRequest::new(
            "cl-5",
            Some(Instrument {
                fix_side: '1',
                symbol: "TEST".to_string(),
            }),
        );
        let instrument = pending.instrument().unwrap();
        assert_eq!(instrument.fix_side, '1');
        assert_eq!(instrument.symbol, "TEST");

        pending.set_order_id("X1");
        assert_eq!(pending.order_id().as_deref(), Some("X1"));
    }
}
