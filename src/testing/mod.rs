//! Test doubles for the engine seam and the REST order path.
//!
//! Regular (non-`cfg(test)`) module so integration tests, downstream crates
//! and the paper-trading binary can all drive the transport stack without a
//! live exchange.

pub mod helpers;
pub mod mock_engine;

pub use helpers::{ack_echo, wait_for_sent, ExecutionReportBuilder, MockRestTransport};
pub use mock_engine::{mock_engine_factory, MockFixEngine, MockFixSession};
