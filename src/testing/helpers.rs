//! Shared test fixtures: ExecutionReport builder, a canned REST transport,
//! and polling helpers for the mock engine.

use crate::core::{
    AmendOrderRequest, CreateOrderRequest, Order, OrderStatus, TransportError,
};
use crate::engine::FixMessage;
use crate::fix::mapper;
use crate::testing::MockFixSession;
use crate::transport::{OrderTransport, TransportKind};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Fluent builder for inbound ExecutionReports.
pub struct ExecutionReportBuilder {
    msg: FixMessage,
}

impl ExecutionReportBuilder {
    pub fn new(exec_type: char, ord_status: char) -> Self {
        let mut msg = FixMessage::new("8");
        msg.set_field(mapper::TAG_EXEC_TYPE, exec_type);
        msg.set_field(mapper::TAG_ORD_STATUS, ord_status);
        msg.set_field(mapper::TAG_TRANSACT_TIME, mapper::fix_timestamp());
        Self { msg }
    }

    pub fn cl_ord_id(mut self, cl_ord_id: &str) -> Self {
        self.msg.set_field(mapper::TAG_CL_ORD_ID, cl_ord_id);
        self
    }

    pub fn orig_cl_ord_id(mut self, orig: &str) -> Self {
        self.msg.set_field(mapper::TAG_ORIG_CL_ORD_ID, orig);
        self
    }

    pub fn order_id(mut self, order_id: &str) -> Self {
        self.msg.set_field(mapper::TAG_ORDER_ID, order_id);
        self
    }

    pub fn symbol(mut self, symbol: &str) -> Self {
        self.msg.set_field(mapper::TAG_SYMBOL, symbol);
        self
    }

    pub fn side(mut self, fix_side: char) -> Self {
        self.msg.set_field(mapper::TAG_SIDE, fix_side);
        self
    }

    pub fn price(mut self, price: i32) -> Self {
        self.msg.set_field(mapper::TAG_PRICE, price);
        self
    }

    pub fn quantities(mut self, initial: i32, cum: i32, leaves: i32) -> Self {
        self.msg.set_field(mapper::TAG_ORDER_QTY, initial);
        self.msg.set_field(mapper::TAG_CUM_QTY, cum);
        self.msg.set_field(mapper::TAG_LEAVES_QTY, leaves);
        self
    }

    pub fn reject_reason(mut self, code: i32, text: &str) -> Self {
        self.msg.set_field(mapper::TAG_ORD_REJ_REASON, code);
        self.msg.set_field(mapper::TAG_TEXT, text);
        self
    }

    pub fn build(self) -> FixMessage {
        self.msg
    }
}

/// ExecutionReport acknowledging a captured NewOrderSingle, echoing its
/// correlation id, instrument and price.
pub fn ack_echo(sent: &FixMessage, order_id: &str) -> FixMessage {
    let qty = sent.get_int(mapper::TAG_ORDER_QTY).unwrap_or(0);
    let mut builder = ExecutionReportBuilder::new(mapper::EXEC_TYPE_NEW, mapper::ORD_STATUS_NEW)
        .cl_ord_id(sent.get_str(mapper::TAG_CL_ORD_ID).unwrap_or(""))
        .order_id(order_id)
        .symbol(sent.get_str(mapper::TAG_SYMBOL).unwrap_or(""))
        .quantities(qty, 0, qty);
    if let Some(side) = sent.get_char(mapper::TAG_SIDE) {
        builder = builder.side(side);
    }
    if let Some(price) = sent.get_int(mapper::TAG_PRICE) {
        builder = builder.price(price);
    }
    builder.build()
}

/// Poll until the session has committed at least `count` messages, returning
/// the newest one. `None` on timeout.
pub fn wait_for_sent(
    session: &MockFixSession,
    count: usize,
    timeout: Duration,
) -> Option<FixMessage> {
    let deadline = Instant::now() + timeout;
    loop {
        if session.sent_count() >= count {
            return session.last_sent();
        }
        if Instant::now() >= deadline {
            return None;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
}

/// Canned HTTP transport standing in for the REST order path.
///
/// Always available unless told otherwise; records each operation and
/// answers with a synthetic acknowledged order.
pub struct MockRestTransport {
    calls: Mutex<Vec<String>>,
    available: AtomicBool,
    fail_next: Mutex<Option<TransportError>>,
}

impl MockRestTransport {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            available: AtomicBool::new(true),
            fail_next: Mutex::new(None),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn fail_next_with(&self, err: TransportError) {
        *self.fail_next.lock() = Some(err);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn take_failure(&self) -> Option<TransportError> {
        self.fail_next.lock().take()
    }
}

impl Default for MockRestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderTransport for MockRestTransport {
    fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, TransportError> {
        self.calls.lock().push(format!("create:{}", request.ticker));
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        let yes_price = request
            .yes_price
            .or_else(|| request.no_price.map(|p| 100 - p))
            .unwrap_or(50);
        Ok(Order {
            order_id: "REST-1".to_string(),
            client_order_id: request
                .client_order_id
                .clone()
                .unwrap_or_else(|| "rest-generated".to_string()),
            ticker: request.ticker.clone(),
            action: request.action,
            side: request.side,
            yes_price,
            no_price: 100 - yes_price,
            initial_count: request.count,
            fill_count: 0,
            remaining_count: request.count,
            status: OrderStatus::Resting,
            last_update: std::time::SystemTime::now(),
            ..Default::default()
        })
    }

    fn cancel_order(&self, order_id: &str) -> Result<Order, TransportError> {
        self.calls.lock().push(format!("cancel:{}", order_id));
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        Ok(Order {
            order_id: order_id.to_string(),
            status: OrderStatus::Canceled,
            ..Default::default()
        })
    }

    fn cancel_orders(&self, order_ids: &[String]) -> Result<(), TransportError> {
        self.calls.lock().push(format!("batch:{}", order_ids.len()));
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        Ok(())
    }

    fn amend_order(
        &self,
        order_id: &str,
        request: &AmendOrderRequest,
    ) -> Result<Order, TransportError> {
        self.calls.lock().push(format!("amend:{}", order_id));
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        let yes_price = request
            .yes_price
            .or_else(|| request.no_price.map(|p| 100 - p))
            .unwrap_or(50);
        Ok(Order {
            order_id: order_id.to_string(),
            yes_price,
            no_price: 100 - yes_price,
            status: OrderStatus::Resting,
            ..Default::default()
        })
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Rest
    }
}
