//! FIX engine seam
//!
//! The crate does not implement FIX framing, sequence numbers, heartbeats or
//! the TLS socket itself; those belong to an engine library that the host
//! application links in. This module defines the contract the rest of the
//! crate programs against:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                FixEngine                     │
//! │  start() / stop() / session(name)            │
//! └──────────────────────────────────────────────┘
//!                      │
//!                      v
//! ┌──────────────────────────────────────────────┐
//! │                FixSession                    │
//! │  try_claim / commit_message / abort_message  │
//! │  add_message_listener / add_state_listener   │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Outbound sends follow a claim/commit-or-abort discipline over the engine's
//! ring buffer: [`OutboundMessage`] is a scoped guard that aborts the claimed
//! slot unless `commit()` succeeded.
//!
//! A programmable in-process implementation for tests and paper trading lives
//! in [`crate::testing::MockFixEngine`].

pub mod message;

pub use message::{FixMessage, OutboundMessage};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Lifecycle states of a FIX session.
///
/// Only `LoggedOn` permits sending application messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Created,
    Connecting,
    Connected,
    LogonSent,
    LoggedOn,
    LoggedOut,
    Disconnected,
    Error,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Created => "CREATED",
            SessionState::Connecting => "CONNECTING",
            SessionState::Connected => "CONNECTED",
            SessionState::LogonSent => "LOGON_SENT",
            SessionState::LoggedOn => "LOGGED_ON",
            SessionState::LoggedOut => "LOGGED_OUT",
            SessionState::Disconnected => "DISCONNECTED",
            SessionState::Error => "ERROR",
        };
        write!(f, "{}", s)
    }
}

/// TLS settings for the initiator socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    pub enabled: bool,
    pub protocol: String,
}

impl TlsConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            protocol: String::new(),
        }
    }
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            protocol: "TLSv1.3".to_string(),
        }
    }
}

/// Per-session engine configuration (initiator role).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub session_name: String,
    pub begin_string: String,
    pub sender_comp_id: String,
    pub target_comp_id: String,
    pub host: String,
    pub port: u16,
    pub heartbeat_interval_secs: u32,
    pub reset_on_logon: bool,
    pub reconnect_interval_secs: u32,
    /// Highest tag number the engine must accept (venue custom tags).
    pub max_tag_number: u32,
    pub tls: TlsConfig,
}

/// Engine-wide configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Scratch directory for sequence-number recovery files.
    pub persistence_path: PathBuf,
    pub session: SessionConfig,
}

/// Inbound application-message hooks.
///
/// Invoked from the engine's inbound-message thread; implementations must not
/// block.
pub trait MessageListener: Send + Sync {
    fn on_message(&self, msg: &FixMessage);

    fn on_session_reject(&self, _ref_seq_num: u64, _ref_msg_type: &str, _reason: i32, _text: &str) {}

    fn on_business_reject(&self, _ref_seq_num: u64, _reason: i32, _text: &str) {}
}

/// Session lifecycle hooks. All methods default to no-ops so listeners only
/// implement the transitions they care about.
pub trait SessionStateListener: Send + Sync {
    fn on_state_change(&self, _old: SessionState, _new: SessionState) {}

    fn on_logon(&self) {}

    fn on_logout(&self, _reason: &str) {}

    fn on_disconnected(&self, _cause: Option<&str>) {}

    fn on_error(&self, _error: &str) {}
}

/// A live FIX session handle.
///
/// Outbound slots are claimed one at a time; a claimed slot must be either
/// committed or aborted. Use [`OutboundMessage::claim`] rather than calling
/// the raw slot operations directly.
pub trait FixSession: Send + Sync {
    /// Reserve an outbound slot for the given MsgType. Returns a claim token,
    /// or `None` when the engine cannot accept a message right now.
    fn try_claim(&self, msg_type: &str) -> Option<u64>;

    /// Publish a previously claimed slot.
    fn commit_message(&self, token: u64, msg: FixMessage) -> Result<()>;

    /// Release a previously claimed slot without sending.
    fn abort_message(&self, token: u64);

    fn add_message_listener(&self, listener: Arc<dyn MessageListener>);

    fn add_state_listener(&self, listener: Arc<dyn SessionStateListener>);
}

/// The engine owning sockets, timers and session threads.
pub trait FixEngine: Send + Sync {
    fn start(&self) -> Result<()>;

    /// Stop all sessions and release sockets and persistence files. Idempotent.
    fn stop(&self);

    fn session(&self, name: &str) -> Option<Arc<dyn FixSession>>;
}

/// Constructs an engine from a finished [`EngineConfig`] at session-manager
/// start time. Lets the manager stay independent of any concrete engine.
pub type EngineFactory = Box<dyn Fn(&EngineConfig) -> Result<Arc<dyn FixEngine>> + Send + Sync>;
