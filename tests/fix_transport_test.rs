//! End-to-end create/amend flows over the mock engine: outbound message
//! shape, reply correlation, and the correlation-map invariant.

mod common;

use common::logged_on_stack;
use fixbridge::fix::mapper;
use fixbridge::testing::{wait_for_sent, ExecutionReportBuilder};
use fixbridge::{
    AmendOrderRequest, CreateOrderRequest, OrderAction, OrderSide, OrderStatus, OrderTransport,
};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(2);

#[test]
fn test_buy_yes_immediate_ack() {
    let stack = logged_on_stack(WAIT);
    let session = stack.session();

    let request = CreateOrderRequest {
        time_in_force: Some(fixbridge::TimeInForce::Gtc),
        ..CreateOrderRequest::limit(
            "TEST-MKT",
            OrderAction::Buy,
            OrderSide::Yes,
            10,
            Some(65),
            None,
        )
    };
    let transport = Arc::clone(&stack.transport);
    let caller = thread::spawn(move || transport.create_order(&request));

    let sent = wait_for_sent(&session, 1, WAIT).expect("NewOrderSingle on the wire");
    assert_eq!(sent.msg_type(), "D");
    assert_eq!(sent.get_char(mapper::TAG_SIDE), Some('1'));
    assert_eq!(sent.get_int(mapper::TAG_ORDER_QTY), Some(10));
    assert_eq!(sent.get_int(mapper::TAG_PRICE), Some(65));
    assert_eq!(sent.get_char(mapper::TAG_TIME_IN_FORCE), Some('1'));
    let cl_ord_id = sent.get_str(mapper::TAG_CL_ORD_ID).unwrap().to_string();
    assert!(cl_ord_id.len() <= 64);

    session.inject(
        &ExecutionReportBuilder::new(mapper::EXEC_TYPE_NEW, mapper::ORD_STATUS_NEW)
            .cl_ord_id(&cl_ord_id)
            .order_id("X1")
            .symbol("TEST-MKT")
            .side('1')
            .price(65)
            .quantities(10, 0, 10)
            .build(),
    );

    let order = caller.join().unwrap().expect("create succeeds");
    assert_eq!(order.order_id, "X1");
    assert_eq!(order.client_order_id, cl_ord_id);
    assert_eq!(order.status, OrderStatus::Resting);
    assert_eq!(order.yes_price, 65);
    assert_eq!(order.no_price, 35);
    assert_eq!(order.fill_count, 0);
    assert_eq!(order.remaining_count, 10);

    // Both correlation maps hold immediately after the call returns.
    assert_eq!(
        stack.tracker.order_id_for_cl_ord_id(&cl_ord_id).as_deref(),
        Some("X1")
    );
    assert_eq!(
        stack.tracker.cl_ord_id_for_order_id("X1").as_deref(),
        Some(&*cl_ord_id)
    );
}

#[test]
fn test_buy_no_translates_to_sell_yes_on_wire() {
    let stack = logged_on_stack(WAIT);
    let session = stack.session();

    let request = CreateOrderRequest::limit(
        "TEST-MKT",
        OrderAction::Buy,
        OrderSide::No,
        5,
        None,
        Some(30),
    );
    let transport = Arc::clone(&stack.transport);
    let caller = thread::spawn(move || transport.create_order(&request));

    let sent = wait_for_sent(&session, 1, WAIT).unwrap();
    // Buying no = selling yes at the complement.
    assert_eq!(sent.get_char(mapper::TAG_SIDE), Some('2'));
    assert_eq!(sent.get_int(mapper::TAG_PRICE), Some(70));

    let cl_ord_id = sent.get_str(mapper::TAG_CL_ORD_ID).unwrap().to_string();
    session.inject(
        &ExecutionReportBuilder::new(mapper::EXEC_TYPE_NEW, mapper::ORD_STATUS_NEW)
            .cl_ord_id(&cl_ord_id)
            .order_id("X2")
            .symbol("TEST-MKT")
            .side('2')
            .price(70)
            .quantities(5, 0, 5)
            .build(),
    );

    let order = caller.join().unwrap().unwrap();
    // The parsed order mirrors the wire: sell-yes at 30/70. The caller's
    // buy-no intent lives only in the original request.
    assert_eq!(order.action, OrderAction::Sell);
    assert_eq!(order.side, OrderSide::Yes);
    assert_eq!(order.yes_price, 30);
    assert_eq!(order.no_price, 70);
}

#[test]
fn test_amend_known_order_price_only() {
    let stack = logged_on_stack(WAIT);
    let session = stack.session();

    // Place and acknowledge a buy-yes order first.
    let request = CreateOrderRequest::limit(
        "TEST-MKT",
        OrderAction::Buy,
        OrderSide::Yes,
        10,
        Some(65),
        None,
    );
    let transport = Arc::clone(&stack.transport);
    let caller = thread::spawn(move || transport.create_order(&request));
    let sent = wait_for_sent(&session, 1, WAIT).unwrap();
    let orig_cl_ord_id = sent.get_str(mapper::TAG_CL_ORD_ID).unwrap().to_string();
    session.inject(
        &ExecutionReportBuilder::new(mapper::EXEC_TYPE_NEW, mapper::ORD_STATUS_NEW)
            .cl_ord_id(&orig_cl_ord_id)
            .order_id("X1")
            .symbol("TEST-MKT")
            .side('1')
            .price(65)
            .quantities(10, 0, 10)
            .build(),
    );
    caller.join().unwrap().unwrap();

    // Amend the price; count untouched.
    let amend = AmendOrderRequest {
        yes_price: Some(70),
        ..Default::default()
    };
    let transport = Arc::clone(&stack.transport);
    let caller = thread::spawn(move || transport.amend_order("X1", &amend));

    let sent = wait_for_sent(&session, 2, WAIT).expect("OrderCancelReplaceRequest on the wire");
    assert_eq!(sent.msg_type(), "G");
    assert_eq!(
        sent.get_str(mapper::TAG_ORIG_CL_ORD_ID),
        Some(&*orig_cl_ord_id)
    );
    let amend_cl_ord_id = sent.get_str(mapper::TAG_CL_ORD_ID).unwrap().to_string();
    assert_ne!(amend_cl_ord_id, orig_cl_ord_id);
    // Cached instrument details flow into the amend message.
    assert_eq!(sent.get_str(mapper::TAG_SYMBOL), Some("TEST-MKT"));
    assert_eq!(sent.get_char(mapper::TAG_SIDE), Some('1'));
    assert_eq!(sent.get_int(mapper::TAG_PRICE), Some(70));
    assert!(!sent.has_field(mapper::TAG_ORDER_QTY));

    session.inject(
        &ExecutionReportBuilder::new(mapper::EXEC_TYPE_REPLACED, mapper::ORD_STATUS_REPLACED)
            .cl_ord_id(&amend_cl_ord_id)
            .order_id("X1")
            .symbol("TEST-MKT")
            .side('1')
            .price(70)
            .quantities(10, 0, 10)
            .build(),
    );

    let order = caller.join().unwrap().unwrap();
    assert_eq!(order.yes_price, 70);
    assert_eq!(order.status, OrderStatus::Resting);
}

#[test]
fn test_caller_supplied_cl_ord_id_is_used() {
    let stack = logged_on_stack(WAIT);
    let session = stack.session();

    let request = CreateOrderRequest {
        client_order_id: Some("my-correlation-id".to_string()),
        ..CreateOrderRequest::limit(
            "TEST-MKT",
            OrderAction::Buy,
            OrderSide::Yes,
            1,
            Some(50),
            None,
        )
    };
    let transport = Arc::clone(&stack.transport);
    let caller = thread::spawn(move || transport.create_order(&request));

    let sent = wait_for_sent(&session, 1, WAIT).unwrap();
    assert_eq!(
        sent.get_str(mapper::TAG_CL_ORD_ID),
        Some("my-correlation-id")
    );

    session.inject(
        &ExecutionReportBuilder::new(mapper::EXEC_TYPE_NEW, mapper::ORD_STATUS_NEW)
            .cl_ord_id("my-correlation-id")
            .order_id("X3")
            .symbol("TEST-MKT")
            .side('1')
            .price(50)
            .quantities(1, 0, 1)
            .build(),
    );
    let order = caller.join().unwrap().unwrap();
    assert_eq!(order.client_order_id, "my-correlation-id");
}
