//! Field-level translation between the domain order model and FIX wire
//! fields.
//!
//! Pure functions only; no state, no I/O. The venue's FIX dialect
//! (FIXT.1.1 / FIX 5.0 SP2) trades the yes leg exclusively:
//!
//! - Side 1 (Buy) means buying yes contracts; selling no maps to it too.
//! - Side 2 (Sell) means selling yes contracts; buying no maps to it too.
//! - Price is the yes-leg price in integer cents (1-99).
//! - OrdType is always 2 (limit).

use crate::core::types::{
    CreateOrderRequest, Order, OrderAction, OrderSide, OrderStatus, SelfTradePrevention,
    TimeInForce,
};
use crate::engine::FixMessage;
use anyhow::{bail, Result};
use chrono::Utc;
use std::time::SystemTime;
use uuid::Uuid;

// Standard FIX tags.
pub const TAG_AVG_PX: u32 = 6;
pub const TAG_CL_ORD_ID: u32 = 11;
pub const TAG_CUM_QTY: u32 = 14;
pub const TAG_EXEC_ID: u32 = 17;
pub const TAG_EXEC_INST: u32 = 18;
pub const TAG_LAST_PX: u32 = 31;
pub const TAG_LAST_QTY: u32 = 32;
pub const TAG_ORDER_ID: u32 = 37;
pub const TAG_ORDER_QTY: u32 = 38;
pub const TAG_ORD_STATUS: u32 = 39;
pub const TAG_ORD_TYPE: u32 = 40;
pub const TAG_ORIG_CL_ORD_ID: u32 = 41;
pub const TAG_PRICE: u32 = 44;
pub const TAG_SYMBOL: u32 = 55;
pub const TAG_SIDE: u32 = 54;
pub const TAG_TEXT: u32 = 58;
pub const TAG_TIME_IN_FORCE: u32 = 59;
pub const TAG_TRANSACT_TIME: u32 = 60;
pub const TAG_ORD_REJ_REASON: u32 = 103;
pub const TAG_EXEC_TYPE: u32 = 150;
pub const TAG_LEAVES_QTY: u32 = 151;
pub const TAG_SECONDARY_CL_ORD_ID: u32 = 526;

// Venue custom tags.
pub const TAG_SELF_TRADE_PREVENTION: u32 = 2964;
pub const TAG_CANCEL_ON_PAUSE: u32 = 21006;
pub const TAG_MAX_EXECUTION_COST: u32 = 21009;

// FIX Side values.
pub const SIDE_BUY: char = '1';
pub const SIDE_SELL: char = '2';

// FIX ExecType values.
pub const EXEC_TYPE_NEW: char = '0';
pub const EXEC_TYPE_PARTIAL_FILL: char = '1';
pub const EXEC_TYPE_FILL: char = '2';
pub const EXEC_TYPE_CANCELED: char = '4';
pub const EXEC_TYPE_REPLACED: char = '5';
pub const EXEC_TYPE_REJECTED: char = '8';
pub const EXEC_TYPE_PENDING_NEW: char = 'A';
pub const EXEC_TYPE_EXPIRED: char = 'C';
pub const EXEC_TYPE_TRADE: char = 'F';

// FIX OrdStatus values.
pub const ORD_STATUS_NEW: char = '0';
pub const ORD_STATUS_PARTIAL: char = '1';
pub const ORD_STATUS_FILLED: char = '2';
pub const ORD_STATUS_CANCELED: char = '4';
pub const ORD_STATUS_REPLACED: char = '5';
pub const ORD_STATUS_PENDING_CANCEL: char = '6';
pub const ORD_STATUS_REJECTED: char = '8';
pub const ORD_STATUS_PENDING_NEW: char = 'A';
pub const ORD_STATUS_EXPIRED: char = 'C';

/// UTC TransactTime in the FIX `yyyyMMdd-HH:mm:ss.SSS` layout.
pub fn fix_timestamp() -> String {
    Utc::now().format("%Y%m%d-%H:%M:%S%.3f").to_string()
}

/// Fresh hyphenated UUID correlation id (the venue caps ClOrdID at 64 chars;
/// a UUID renders as 36).
pub fn generate_cl_ord_id() -> String {
    Uuid::new_v4().to_string()
}

// ==================== Side mapping ====================

/// Domain action+side → FIX Side.
///
/// ```text
/// buy  yes → 1 (Buy)
/// sell yes → 2 (Sell)
/// buy  no  → 2 (Sell)   buying no is selling yes
/// sell no  → 1 (Buy)    selling no is buying yes
/// ```
pub fn side_to_fix(action: OrderAction, side: OrderSide) -> char {
    match (action, side) {
        (OrderAction::Buy, OrderSide::Yes) => SIDE_BUY,
        (OrderAction::Sell, OrderSide::Yes) => SIDE_SELL,
        (OrderAction::Buy, OrderSide::No) => SIDE_SELL,
        (OrderAction::Sell, OrderSide::No) => SIDE_BUY,
    }
}

/// FIX Side → domain action. Side 1 reports as "buy", side 2 as "sell".
pub fn fix_side_to_action(fix_side: char) -> OrderAction {
    if fix_side == SIDE_BUY {
        OrderAction::Buy
    } else {
        OrderAction::Sell
    }
}

/// FIX Side → domain side. The wire always deals in yes contracts.
pub fn fix_side_to_side(_fix_side: char) -> OrderSide {
    OrderSide::Yes
}

// ==================== Price mapping ====================

/// Project the request's price onto the FIX Price field (always a yes-leg
/// price). `None` when the request carries neither price.
pub fn price_to_fix(request: &CreateOrderRequest) -> Option<i32> {
    match request.side {
        OrderSide::Yes => request.yes_price.or_else(|| request.no_price.map(|p| 100 - p)),
        OrderSide::No => request.no_price.map(|p| 100 - p).or(request.yes_price),
    }
}

// ==================== Status mapping ====================

/// FIX OrdStatus → domain status. Unlisted values map to `Unknown`.
pub fn ord_status_to_domain(ord_status: char) -> OrderStatus {
    match ord_status {
        ORD_STATUS_NEW | ORD_STATUS_PARTIAL | ORD_STATUS_PENDING_NEW | ORD_STATUS_REPLACED => {
            OrderStatus::Resting
        }
        ORD_STATUS_FILLED => OrderStatus::Executed,
        ORD_STATUS_CANCELED | ORD_STATUS_PENDING_CANCEL => OrderStatus::Canceled,
        ORD_STATUS_REJECTED => OrderStatus::Rejected,
        ORD_STATUS_EXPIRED => OrderStatus::Expired,
        _ => OrderStatus::Unknown,
    }
}

// ==================== TimeInForce mapping ====================

/// Domain TimeInForce → FIX char. Unset defaults to GTC.
pub fn tif_to_fix(tif: Option<TimeInForce>) -> char {
    match tif {
        Some(TimeInForce::Day) => '0',
        Some(TimeInForce::Gtc) | None => '1',
        Some(TimeInForce::Ioc) => '3',
        Some(TimeInForce::Fok) => '4',
    }
}

/// FIX TimeInForce char → domain. Unknown values read as GTC.
pub fn fix_to_tif(fix_tif: char) -> TimeInForce {
    match fix_tif {
        '0' => TimeInForce::Day,
        '3' => TimeInForce::Ioc,
        '4' => TimeInForce::Fok,
        _ => TimeInForce::Gtc,
    }
}

fn stp_to_fix(stp: SelfTradePrevention) -> char {
    match stp {
        SelfTradePrevention::CancelNewOrder => '1',
        SelfTradePrevention::CancelRestingOrder => '2',
    }
}

// ==================== Message populators ====================

/// Fill a claimed NewOrderSingle (MsgType D) body from a create request.
///
/// Fails when the request carries no usable price; the caller aborts the
/// claimed slot in that case.
pub fn populate_new_order(
    msg: &mut FixMessage,
    request: &CreateOrderRequest,
    cl_ord_id: &str,
) -> Result<()> {
    let price = match price_to_fix(request) {
        Some(p) => p,
        None => bail!("create request has neither yes_price nor no_price"),
    };

    msg.set_field(TAG_CL_ORD_ID, cl_ord_id);
    msg.set_field(TAG_SYMBOL, &request.ticker);
    msg.set_field(TAG_SIDE, side_to_fix(request.action, request.side));
    msg.set_field(TAG_ORDER_QTY, request.count);
    msg.set_field(TAG_ORD_TYPE, '2');
    msg.set_field(TAG_PRICE, price);
    msg.set_field(TAG_TIME_IN_FORCE, tif_to_fix(request.time_in_force));
    msg.set_field(TAG_TRANSACT_TIME, fix_timestamp());

    if request.post_only == Some(true) {
        // ExecInst 6: participate, don't initiate.
        msg.set_field(TAG_EXEC_INST, '6');
    }
    if let Some(stp) = request.self_trade_prevention {
        msg.set_field(TAG_SELF_TRADE_PREVENTION, stp_to_fix(stp));
    }
    if let Some(cancel_on_pause) = request.cancel_on_pause {
        msg.set_field(TAG_CANCEL_ON_PAUSE, cancel_on_pause);
    }
    if let Some(group) = &request.order_group_id {
        msg.set_field(TAG_SECONDARY_CL_ORD_ID, group);
    }
    if let Some(max_cost) = request.buy_max_cost {
        msg.set_field(TAG_MAX_EXECUTION_COST, max_cost);
    }

    Ok(())
}

/// Fill a claimed OrderCancelRequest (MsgType F) body.
pub fn populate_cancel_request(
    msg: &mut FixMessage,
    cl_ord_id: &str,
    orig_cl_ord_id: &str,
    symbol: &str,
    fix_side: char,
) {
    msg.set_field(TAG_CL_ORD_ID, cl_ord_id);
    msg.set_field(TAG_ORIG_CL_ORD_ID, orig_cl_ord_id);
    msg.set_field(TAG_SYMBOL, symbol);
    msg.set_field(TAG_SIDE, fix_side);
    msg.set_field(TAG_TRANSACT_TIME, fix_timestamp());
}

/// Fill a claimed OrderCancelReplaceRequest (MsgType G) body. An omitted
/// price or quantity tag tells the exchange to keep the current value.
pub fn populate_amend_request(
    msg: &mut FixMessage,
    cl_ord_id: &str,
    orig_cl_ord_id: &str,
    symbol: &str,
    fix_side: char,
    new_price: Option<i32>,
    new_qty: Option<i32>,
) {
    msg.set_field(TAG_CL_ORD_ID, cl_ord_id);
    msg.set_field(TAG_ORIG_CL_ORD_ID, orig_cl_ord_id);
    msg.set_field(TAG_SYMBOL, symbol);
    msg.set_field(TAG_SIDE, fix_side);
    msg.set_field(TAG_ORD_TYPE, '2');
    msg.set_field(TAG_TRANSACT_TIME, fix_timestamp());

    if let Some(price) = new_price {
        msg.set_field(TAG_PRICE, price);
    }
    if let Some(qty) = new_qty {
        msg.set_field(TAG_ORDER_QTY, qty);
    }
}

// ==================== ExecutionReport parsing ====================

/// Parse an ExecutionReport (MsgType 8) into a domain [`Order`].
///
/// Absent fields keep their defaults. Price assignment inverts the wire
/// projection: Side 1 carries a yes price directly, Side 2 the complement.
pub fn parse_execution_report(msg: &FixMessage) -> Order {
    let mut order = Order::default();

    if let Some(order_id) = msg.get_str(TAG_ORDER_ID) {
        order.order_id = order_id.to_string();
    }
    if let Some(cl_ord_id) = msg.get_str(TAG_CL_ORD_ID) {
        order.client_order_id = cl_ord_id.to_string();
    }
    if let Some(symbol) = msg.get_str(TAG_SYMBOL) {
        order.ticker = symbol.to_string();
    }

    if let Some(fix_side) = msg.get_char(TAG_SIDE) {
        order.action = fix_side_to_action(fix_side);
        order.side = fix_side_to_side(fix_side);
    }

    if let Some(ord_status) = msg.get_char(TAG_ORD_STATUS) {
        order.status = ord_status_to_domain(ord_status);
    }

    if let Some(qty) = msg.get_int(TAG_ORDER_QTY) {
        order.initial_count = qty;
    }
    if let Some(cum) = msg.get_int(TAG_CUM_QTY) {
        order.fill_count = cum;
    }
    if let Some(leaves) = msg.get_int(TAG_LEAVES_QTY) {
        order.remaining_count = leaves;
    }

    if let (Some(price), Some(fix_side)) = (msg.get_int(TAG_PRICE), msg.get_char(TAG_SIDE)) {
        if fix_side == SIDE_BUY {
            order.yes_price = price;
            order.no_price = 100 - price;
        } else {
            order.yes_price = 100 - price;
            order.no_price = price;
        }
    }

    if msg.has_field(TAG_TRANSACT_TIME) {
        order.last_update = SystemTime::now();
    }

    order
}

/// ExecType (tag 150) of an ExecutionReport.
pub fn exec_type(msg: &FixMessage) -> Option<char> {
    msg.get_char(TAG_EXEC_TYPE)
}

/// Assemble a human-readable rejection reason from OrdRejReason (103) and
/// Text (58).
pub fn rejection_reason(msg: &FixMessage) -> String {
    let mut reason = String::new();
    if let Some(code) = msg.get_int(TAG_ORD_REJ_REASON) {
        reason.push_str(&format!("OrdRejReason={}", code));
    }
    if let Some(text) = msg.get_str(TAG_TEXT) {
        if !reason.is_empty() {
            reason.push_str(", ");
        }
        reason.push_str(text);
    }
    if reason.is_empty() {
        reason.push_str("Unknown rejection");
    }
    reason
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Side mapping ====================

    #[test]
    fn test_side_mapping_buy_yes_is_fix_buy() {
        assert_eq!(side_to_fix(OrderAction::Buy, OrderSide::Yes), '1');
    }

    #[test]
    fn test_side_mapping_sell_yes_is_fix_sell() {
        assert_eq!(side_to_fix(OrderAction::Sell, OrderSide::Yes), '2');
    }

    #[test]
    fn test_side_mapping_buy_no_is_fix_sell() {
        // Buying no = selling yes on this venue.
        assert_eq!(side_to_fix(OrderAction::Buy, OrderSide::No), '2');
    }

    #[test]
    fn test_side_mapping_sell_no_is_fix_buy() {
        // Selling no = buying yes on this venue.
        assert_eq!(side_to_fix(OrderAction::Sell, OrderSide::No), '1');
    }

    #[test]
    fn test_fix_side_to_action() {
        assert_eq!(fix_side_to_action('1'), OrderAction::Buy);
        assert_eq!(fix_side_to_action('2'), OrderAction::Sell);
    }

    #[test]
    fn test_fix_side_to_side_always_yes() {
        assert_eq!(fix_side_to_side('1'), OrderSide::Yes);
        assert_eq!(fix_side_to_side('2'), OrderSide::Yes);
    }

    // ==================== Price mapping ====================

    fn request(action: OrderAction, side: OrderSide, yes: Option<i32>, no: Option<i32>) -> CreateOrderRequest {
        CreateOrderRequest::limit("TEST", action, side, 1, yes, no)
    }

    #[test]
    fn test_price_buy_yes_uses_yes_price() {
        let req = request(OrderAction::Buy, OrderSide::Yes, Some(65), None);
        assert_eq!(price_to_fix(&req), Some(65));
    }

    #[test]
    fn test_price_sell_yes_uses_yes_price() {
        let req = request(OrderAction::Sell, OrderSide::Yes, Some(40), None);
        assert_eq!(price_to_fix(&req), Some(40));
    }

    #[test]
    fn test_price_buy_no_converts_to_complement() {
        // Buy no at 30 = sell yes at 70.
        let req = request(OrderAction::Buy, OrderSide::No, None, Some(30));
        assert_eq!(price_to_fix(&req), Some(70));
    }

    #[test]
    fn test_price_sell_no_converts_to_complement() {
        // Sell no at 45 = buy yes at 55.
        let req = request(OrderAction::Sell, OrderSide::No, None, Some(45));
        assert_eq!(price_to_fix(&req), Some(55));
    }

    #[test]
    fn test_price_yes_side_falls_back_to_no_price() {
        let req = request(OrderAction::Buy, OrderSide::Yes, None, Some(35));
        assert_eq!(price_to_fix(&req), Some(65));
    }

    #[test]
    fn test_price_missing_both() {
        let req = request(OrderAction::Buy, OrderSide::Yes, None, None);
        assert_eq!(price_to_fix(&req), None);
    }

    #[test]
    fn test_price_boundaries_round_trip() {
        for price in [1, 50, 99] {
            let req = request(OrderAction::Buy, OrderSide::Yes, Some(price), None);
            assert_eq!(price_to_fix(&req), Some(price));

            let req = request(OrderAction::Buy, OrderSide::No, None, Some(price));
            assert_eq!(price_to_fix(&req), Some(100 - price));
        }
    }

    // ==================== Status mapping ====================

    #[test]
    fn test_status_resting_group() {
        assert_eq!(ord_status_to_domain('0'), OrderStatus::Resting);
        assert_eq!(ord_status_to_domain('1'), OrderStatus::Resting);
        assert_eq!(ord_status_to_domain('A'), OrderStatus::Resting);
        assert_eq!(ord_status_to_domain('5'), OrderStatus::Resting);
    }

    #[test]
    fn test_status_terminal_values() {
        assert_eq!(ord_status_to_domain('2'), OrderStatus::Executed);
        assert_eq!(ord_status_to_domain('4'), OrderStatus::Canceled);
        assert_eq!(ord_status_to_domain('6'), OrderStatus::Canceled);
        assert_eq!(ord_status_to_domain('8'), OrderStatus::Rejected);
        assert_eq!(ord_status_to_domain('C'), OrderStatus::Expired);
    }

    #[test]
    fn test_status_unlisted_is_unknown() {
        assert_eq!(ord_status_to_domain('E'), OrderStatus::Unknown);
        assert_eq!(ord_status_to_domain('9'), OrderStatus::Unknown);
    }

    // ==================== TimeInForce mapping ====================

    #[test]
    fn test_tif_to_fix() {
        assert_eq!(tif_to_fix(Some(TimeInForce::Day)), '0');
        assert_eq!(tif_to_fix(Some(TimeInForce::Gtc)), '1');
        assert_eq!(tif_to_fix(Some(TimeInForce::Ioc)), '3');
        assert_eq!(tif_to_fix(Some(TimeInForce::Fok)), '4');
    }

    #[test]
    fn test_tif_unset_defaults_gtc() {
        assert_eq!(tif_to_fix(None), '1');
    }

    #[test]
    fn test_tif_round_trip() {
        for tif in [
            TimeInForce::Day,
            TimeInForce::Gtc,
            TimeInForce::Ioc,
            TimeInForce::Fok,
        ] {
            assert_eq!(fix_to_tif(tif_to_fix(Some(tif))), tif);
        }
    }

    #[test]
    fn test_tif_unknown_char_reads_gtc() {
        assert_eq!(fix_to_tif('9'), TimeInForce::Gtc);
    }

    // ==================== ClOrdID generation ====================

    #[test]
    fn test_generate_cl_ord_id_unique_and_bounded() {
        let id1 = generate_cl_ord_id();
        let id2 = generate_cl_ord_id();
        assert_ne!(id1, id2);
        // Venue caps ClOrdID at 64 characters.
        assert!(id1.len() <= 64);
        assert_eq!(id1.len(), 36);
    }

    #[test]
    fn test_fix_timestamp_layout() {
        let ts = fix_timestamp();
        // yyyyMMdd-HH:mm:ss.SSS
        assert_eq!(ts.len(), 21);
        assert_eq!(&ts[8..9], "-");
        assert_eq!(&ts[17..18], ".");
    }

    // ==================== Populators ====================

    #[test]
    fn test_populate_new_order_required_tags() {
        let req = CreateOrderRequest {
            time_in_force: Some(TimeInForce::Gtc),
            ..request(OrderAction::Buy, OrderSide::Yes, Some(65), None)
        };
        let mut msg = FixMessage::new("D");
        populate_new_order(&mut msg, &req, "cl-1").unwrap();

        assert_eq!(msg.get_str(TAG_CL_ORD_ID), Some("cl-1"));
        assert_eq!(msg.get_str(TAG_SYMBOL), Some("TEST"));
        assert_eq!(msg.get_char(TAG_SIDE), Some('1'));
        assert_eq!(msg.get_int(TAG_ORDER_QTY), Some(1));
        assert_eq!(msg.get_char(TAG_ORD_TYPE), Some('2'));
        assert_eq!(msg.get_int(TAG_PRICE), Some(65));
        assert_eq!(msg.get_char(TAG_TIME_IN_FORCE), Some('1'));
        assert!(msg.has_field(TAG_TRANSACT_TIME));
        assert!(!msg.has_field(TAG_EXEC_INST));
    }

    #[test]
    fn test_populate_new_order_optional_tags() {
        let req = CreateOrderRequest {
            post_only: Some(true),
            self_trade_prevention: Some(SelfTradePrevention::CancelRestingOrder),
            cancel_on_pause: Some(true),
            order_group_id: Some("grp-9".to_string()),
            buy_max_cost: Some(650),
            ..request(OrderAction::Buy, OrderSide::Yes, Some(65), None)
        };
        let mut msg = FixMessage::new("D");
        populate_new_order(&mut msg, &req, "cl-2").unwrap();

        assert_eq!(msg.get_char(TAG_EXEC_INST), Some('6'));
        assert_eq!(msg.get_char(TAG_SELF_TRADE_PREVENTION), Some('2'));
        assert_eq!(msg.get_str(TAG_CANCEL_ON_PAUSE), Some("true"));
        assert_eq!(msg.get_str(TAG_SECONDARY_CL_ORD_ID), Some("grp-9"));
        assert_eq!(msg.get_str(TAG_MAX_EXECUTION_COST), Some("650"));
    }

    #[test]
    fn test_populate_new_order_without_price_fails() {
        let req = request(OrderAction::Buy, OrderSide::Yes, None, None);
        let mut msg = FixMessage::new("D");
        assert!(populate_new_order(&mut msg, &req, "cl-3").is_err());
    }

    #[test]
    fn test_populate_cancel_request() {
        let mut msg = FixMessage::new("F");
        populate_cancel_request(&mut msg, "cl-new", "cl-orig", "TEST", '1');

        assert_eq!(msg.get_str(TAG_CL_ORD_ID), Some("cl-new"));
        assert_eq!(msg.get_str(TAG_ORIG_CL_ORD_ID), Some("cl-orig"));
        assert_eq!(msg.get_str(TAG_SYMBOL), Some("TEST"));
        assert_eq!(msg.get_char(TAG_SIDE), Some('1'));
        assert!(msg.has_field(TAG_TRANSACT_TIME));
    }

    #[test]
    fn test_populate_amend_price_only_omits_qty() {
        let mut msg = FixMessage::new("G");
        populate_amend_request(&mut msg, "cl-new", "cl-orig", "TEST", '1', Some(70), None);

        assert_eq!(msg.get_int(TAG_PRICE), Some(70));
        assert!(!msg.has_field(TAG_ORDER_QTY));
        assert_eq!(msg.get_char(TAG_ORD_TYPE), Some('2'));
    }

    // ==================== ExecutionReport parsing ====================

    fn exec_report(fix_side: char, ord_status: char, price: i32) -> FixMessage {
        let mut msg = FixMessage::new("8");
        msg.set_field(TAG_ORDER_ID, "X1");
        msg.set_field(TAG_CL_ORD_ID, "cl-1");
        msg.set_field(TAG_SYMBOL, "TEST-MKT");
        msg.set_field(TAG_SIDE, fix_side);
        msg.set_field(TAG_ORD_STATUS, ord_status);
        msg.set_field(TAG_ORDER_QTY, 10);
        msg.set_field(TAG_CUM_QTY, 0);
        msg.set_field(TAG_LEAVES_QTY, 10);
        msg.set_field(TAG_PRICE, price);
        msg.set_field(TAG_TRANSACT_TIME, fix_timestamp());
        msg
    }

    #[test]
    fn test_parse_buy_side_report() {
        let order = parse_execution_report(&exec_report('1', '0', 65));

        assert_eq!(order.order_id, "X1");
        assert_eq!(order.client_order_id, "cl-1");
        assert_eq!(order.ticker, "TEST-MKT");
        assert_eq!(order.action, OrderAction::Buy);
        assert_eq!(order.side, OrderSide::Yes);
        assert_eq!(order.status, OrderStatus::Resting);
        assert_eq!(order.yes_price, 65);
        assert_eq!(order.no_price, 35);
        assert_eq!(order.initial_count, 10);
        assert_eq!(order.fill_count, 0);
        assert_eq!(order.remaining_count, 10);
    }

    #[test]
    fn test_parse_sell_side_price_complement() {
        let order = parse_execution_report(&exec_report('2', '0', 70));
        assert_eq!(order.action, OrderAction::Sell);
        assert_eq!(order.yes_price, 30);
        assert_eq!(order.no_price, 70);
    }

    #[test]
    fn test_parse_sparse_report_keeps_defaults() {
        let mut msg = FixMessage::new("8");
        msg.set_field(TAG_CL_ORD_ID, "cl-1");
        let order = parse_execution_report(&msg);

        assert_eq!(order.client_order_id, "cl-1");
        assert!(order.order_id.is_empty());
        assert_eq!(order.status, OrderStatus::Unknown);
        assert_eq!(order.yes_price, 0);
    }

    #[test]
    fn test_populate_then_parse_preserves_request() {
        let req = request(OrderAction::Buy, OrderSide::Yes, Some(65), None);
        let mut out = FixMessage::new("D");
        populate_new_order(&mut out, &req, "cl-rt").unwrap();

        // Echo the order fields back as an ExecutionReport would.
        let mut echo = FixMessage::new("8");
        echo.set_field(TAG_CL_ORD_ID, out.get_str(TAG_CL_ORD_ID).unwrap());
        echo.set_field(TAG_SYMBOL, out.get_str(TAG_SYMBOL).unwrap());
        echo.set_field(TAG_SIDE, out.get_char(TAG_SIDE).unwrap());
        echo.set_field(TAG_ORDER_QTY, out.get_int(TAG_ORDER_QTY).unwrap());
        echo.set_field(TAG_PRICE, out.get_int(TAG_PRICE).unwrap());
        echo.set_field(TAG_ORD_STATUS, '0');

        let order = parse_execution_report(&echo);
        assert_eq!(order.ticker, req.ticker);
        assert_eq!(order.action, req.action);
        assert_eq!(order.side, OrderSide::Yes);
        assert_eq!(order.initial_count, req.count);
        assert_eq!(order.yes_price, 65);
        assert_eq!(order.no_price, 35);
    }

    // ==================== Rejection reason ====================

    #[test]
    fn test_rejection_reason_both_tags() {
        let mut msg = FixMessage::new("8");
        msg.set_field(TAG_ORD_REJ_REASON, 3);
        msg.set_field(TAG_TEXT, "Market closed");
        assert_eq!(rejection_reason(&msg), "OrdRejReason=3, Market closed");
    }

    #[test]
    fn test_rejection_reason_text_only() {
        let mut msg = FixMessage::new("8");
        msg.set_field(TAG_TEXT, "Insufficient funds");
        assert_eq!(rejection_reason(&msg), "Insufficient funds");
    }

    #[test]
    fn test_rejection_reason_neither_tag() {
        let msg = FixMessage::new("8");
        assert_eq!(rejection_reason(&msg), "Unknown rejection");
    }
}
