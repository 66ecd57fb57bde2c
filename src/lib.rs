//! Fixbridge - FIX order transport for binary-options trading
//!
//! Routes order operations for a binary-options venue through a pluggable
//! transport abstraction that hides whether a call traverses an HTTP
//! request/response pair or the persistent FIX session. The FIX path owns a
//! long-lived authenticated session, encodes operations as FIX application
//! messages, correlates asynchronously delivered ExecutionReports back to
//! blocked callers, and degrades to REST when the session is unhealthy.
//!
//! ## System Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      HOST APPLICATION                        │
//! │         strategies · risk · REST client · scheduler          │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │ OrderTransport
//!                                ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  FallbackTransport                                           │
//! │    primary: FixOrderTransport    secondary: REST (external)  │
//! └──────────────┬───────────────────────────────────────────────┘
//!                │
//!                ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  FixOrderTransport                                           │
//! │    validate → register pending → claim/populate/commit       │
//! │    → block on correlated reply (deadline)                    │
//! ├──────────────────────────┬───────────────────────────────────┤
//! │  FixSessionManager       │  FixOrderStateTracker             │
//! │    lifecycle, logon      │  pending table, ClOrdID↔OrderID   │
//! │    state cache           │  maps, update sink, stale sweep   │
//! └──────────────┬───────────┴───────────────────────────────────┘
//!                │ engine seam (traits)
//!                ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  FIX engine library (external): framing, sequence numbers,   │
//! │  heartbeats, resend, TLS socket, reconnect                   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Threading model
//!
//! Caller threads block inside transport operations on a per-request
//! single-shot channel. The engine contributes one inbound-message thread;
//! the tracker's handlers run on it and complete pending requests there.
//! Neither the transport nor the fallback spawns background work; the only
//! periodic job, the stale-pending sweep, is driven by the host's scheduler.
//!
//! ## Core Modules
//!
//! - [`core`] - domain order model and the [`TransportError`] taxonomy
//! - [`engine`] - the FIX engine seam: traits, message body, outbound slot
//!   guard
//! - [`fix`] - mapper, session manager, tracker and the FIX transport
//! - [`transport`] - the [`OrderTransport`] contract, fallback composition
//!   and startup wiring
//! - [`testing`] - programmable mock engine and REST double
//! - [`utils`] - logging setup and transport counters
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use fixbridge::fix::{FixConfig, TransportMode};
//! use fixbridge::testing::{mock_engine_factory, MockFixEngine, MockRestTransport};
//! use fixbridge::transport::build_transport;
//! use std::sync::Arc;
//!
//! let config = FixConfig {
//!     sender_comp_id: "your-fix-api-key-uuid".to_string(),
//!     transport_mode: TransportMode::FixWithRestFallback,
//!     ..Default::default()
//! };
//!
//! // A real deployment passes a factory for the production engine and the
//! // REST client; the mock pair works anywhere.
//! let engine = MockFixEngine::new();
//! let rest = Arc::new(MockRestTransport::new());
//! let handle = build_transport(&config, mock_engine_factory(engine), rest, None)?;
//!
//! let transport = handle.transport();
//! # let _ = transport;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod core;
pub mod engine;
pub mod fix;
pub mod testing;
pub mod transport;
pub mod utils;

// Re-export the contract types callers touch on every operation.
pub use crate::core::{
    AmendOrderRequest, CreateOrderRequest, Order, OrderAction, OrderSide, OrderStatus,
    TimeInForce, TransportError,
};
pub use crate::transport::{OrderTransport, TransportKind};

// Re-export error types
pub use anyhow::{Error, Result};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::core::{
        AmendOrderRequest, CreateOrderRequest, Order, OrderAction, OrderSide, OrderStatus,
        TimeInForce, TransportError,
    };
    pub use crate::fix::{FixConfig, FixOrderTransport, FixSessionManager, TransportMode};
    pub use crate::transport::{
        build_transport, FallbackTransport, FixTransportHandle, OrderTransport, TransportKind,
    };
    pub use crate::{Error, Result};
}
