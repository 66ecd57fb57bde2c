//! FIX order path: session lifecycle, field mapping, request correlation and
//! the transport built on top of them.
//!
//! ```text
//!  caller thread                      inbound-message thread
//!  ─────────────                      ──────────────────────
//!  FixOrderTransport                  FixOrderStateTracker
//!     │  register pending                 │  ExecutionReport / CancelReject
//!     │  claim → populate → commit        │  parse via mapper
//!     │  block on reply ◄─────────────────┤  complete pending / fire sink
//!     ▼                                   ▼
//!  FixSessionManager ──────────────► engine seam (sockets, heartbeats)
//! ```

pub mod config;
pub mod mapper;
pub mod pending;
pub mod session;
pub mod tracker;
pub mod transport;

pub use config::{FixConfig, TransportMode};
pub use pending::{Instrument, PendingRequest};
pub use session::FixSessionManager;
pub use tracker::{FixOrderStateTracker, OrderUpdateSink};
pub use transport::FixOrderTransport;
