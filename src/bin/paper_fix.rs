//! Paper-trade the FIX order path against the in-process mock engine.
//!
//! Wires the full stack (session manager, tracker, FIX transport, REST
//! fallback) exactly as a live deployment would, but with the mock engine
//! echoing acknowledgements instead of a socket. Walks one order through
//! create → amend → cancel, then knocks the session over to show the
//! fallback serving.

use anyhow::Result;
use clap::Parser;
use fixbridge::prelude::*;
use fixbridge::testing::{mock_engine_factory, MockFixEngine, MockRestTransport};
use fixbridge::transport::build_transport;
use fixbridge::utils::{init_logging, LogOptions};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "paper_fix",
    about = "Run a paper order session over the FIX transport stack"
)]
struct Args {
    /// Market ticker to trade.
    #[arg(long, default_value = "TEST-MKT")]
    ticker: String,

    /// Contracts per order.
    #[arg(long, default_value_t = 10)]
    count: i32,

    /// Yes-leg limit price in cents (1-99).
    #[arg(long, default_value_t = 65)]
    yes_price: i32,

    /// Simulated exchange acknowledgement delay.
    #[arg(long, default_value_t = 5)]
    ack_delay_ms: u64,

    #[arg(long, default_value = "info")]
    log_level: String,

    #[arg(long)]
    json_logs: bool,

    /// Log per-message FIX traffic at debug.
    #[arg(long)]
    log_wire: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&LogOptions {
        level: args.log_level.clone(),
        json: args.json_logs,
        wire_debug: args.log_wire,
    });

    let engine = MockFixEngine::new();
    engine.set_logon_on_start(true);
    engine
        .session_handle()
        .enable_auto_ack(Duration::from_millis(args.ack_delay_ms));

    let config = FixConfig {
        sender_comp_id: "paper-session-key".to_string(),
        transport_mode: TransportMode::FixWithRestFallback,
        ..Default::default()
    };
    let rest = Arc::new(MockRestTransport::new());
    let handle = build_transport(
        &config,
        mock_engine_factory(Arc::clone(&engine)),
        rest,
        Some(Box::new(|order: &Order| {
            info!(
                order_id = %order.order_id,
                status = %order.status,
                fill_count = order.fill_count,
                "post-ack order update"
            );
        })),
    )?;

    // Stale-pending sweep, normally owned by the host's scheduler.
    if let Some(tracker) = handle.tracker() {
        let tracker = Arc::clone(tracker);
        std::thread::spawn(move || loop {
            std::thread::sleep(Duration::from_secs(1));
            tracker.cleanup_stale();
        });
    }

    let transport = handle.transport();
    info!(kind = %transport.kind(), "transport ready");

    let request = CreateOrderRequest::limit(
        &args.ticker,
        OrderAction::Buy,
        OrderSide::Yes,
        args.count,
        Some(args.yes_price),
        None,
    );
    let order = transport.create_order(&request)?;
    info!(
        order_id = %order.order_id,
        status = %order.status,
        yes_price = order.yes_price,
        no_price = order.no_price,
        remaining = order.remaining_count,
        "order created"
    );

    let amend = AmendOrderRequest {
        yes_price: Some((args.yes_price + 5).min(99)),
        ..Default::default()
    };
    let amended = transport.amend_order(&order.order_id, &amend)?;
    info!(
        order_id = %order.order_id,
        yes_price = amended.yes_price,
        status = %amended.status,
        "order amended"
    );

    let canceled = transport.cancel_order(&order.order_id)?;
    info!(
        order_id = %order.order_id,
        status = %canceled.status,
        "order canceled"
    );

    // Knock the session over: the next create degrades to REST.
    engine.session_handle().simulate_disconnect();
    info!(kind = %transport.kind(), "session down, transport degraded");
    let rest_order = transport.create_order(&request)?;
    info!(
        order_id = %rest_order.order_id,
        "order created via fallback"
    );

    handle.shutdown();
    Ok(())
}
