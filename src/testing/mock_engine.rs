//! Programmable in-process FIX engine for tests and paper trading.
//!
//! Implements the engine seam without sockets: committed outbound messages
//! are recorded for inspection, inbound messages and state transitions are
//! injected by the test (or generated by the optional auto-acknowledger,
//! which echoes every committed message back as a matching ExecutionReport
//! from a separate thread, the way a real engine's inbound thread would).

use crate::engine::{
    FixEngine, FixMessage, FixSession, MessageListener, SessionState, SessionStateListener,
};
use crate::fix::mapper;
use anyhow::{bail, Result};
use crossbeam::atomic::AtomicCell;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub struct MockFixSession {
    current: AtomicCell<SessionState>,
    message_listeners: RwLock<Vec<Arc<dyn MessageListener>>>,
    state_listeners: RwLock<Vec<Arc<dyn SessionStateListener>>>,
    sent: Mutex<Vec<FixMessage>>,
    aborted: Mutex<Vec<u64>>,
    next_token: AtomicU64,
    next_order_seq: AtomicU64,
    refuse_claims: AtomicBool,
    fail_commit: AtomicBool,
    auto_ack: Mutex<Option<Duration>>,
}

impl MockFixSession {
    pub fn new() -> Self {
        Self {
            current: AtomicCell::new(SessionState::Created),
            message_listeners: RwLock::new(Vec::new()),
            state_listeners: RwLock::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            aborted: Mutex::new(Vec::new()),
            next_token: AtomicU64::new(1),
            next_order_seq: AtomicU64::new(1),
            refuse_claims: AtomicBool::new(false),
            fail_commit: AtomicBool::new(false),
            auto_ack: Mutex::new(None),
        }
    }

    // ==================== Test controls ====================

    /// Make subsequent claims fail, as when the outbound ring buffer is full.
    pub fn set_refuse_claims(&self, refuse: bool) {
        self.refuse_claims.store(refuse, Ordering::SeqCst);
    }

    /// Make subsequent commits fail after the claim succeeded.
    pub fn set_fail_commit(&self, fail: bool) {
        self.fail_commit.store(fail, Ordering::SeqCst);
    }

    /// Echo every committed message back as a matching ExecutionReport after
    /// `delay`, from a spawned thread.
    pub fn enable_auto_ack(&self, delay: Duration) {
        *self.auto_ack.lock() = Some(delay);
    }

    pub fn sent_messages(&self) -> Vec<FixMessage> {
        self.sent.lock().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn last_sent(&self) -> Option<FixMessage> {
        self.sent.lock().last().cloned()
    }

    pub fn aborted_count(&self) -> usize {
        self.aborted.lock().len()
    }

    /// Deliver an inbound message to every registered listener, on the
    /// calling thread.
    pub fn inject(&self, msg: &FixMessage) {
        let listeners = self.message_listeners.read().clone();
        for listener in listeners {
            listener.on_message(msg);
        }
    }

    /// Deliver an inbound message from a spawned thread after `delay`,
    /// mimicking the engine's inbound-message thread.
    pub fn inject_later(&self, msg: FixMessage, delay: Duration) {
        let listeners = self.message_listeners.read().clone();
        std::thread::spawn(move || {
            std::thread::sleep(delay);
            for listener in listeners {
                listener.on_message(&msg);
            }
        });
    }

    /// Walk the session through connect and logon, firing state callbacks.
    pub fn simulate_logon(&self) {
        self.transition(SessionState::Connecting);
        self.transition(SessionState::Connected);
        self.transition(SessionState::LogonSent);
        self.transition(SessionState::LoggedOn);
        let listeners = self.state_listeners.read().clone();
        for listener in listeners {
            listener.on_logon();
        }
    }

    pub fn simulate_disconnect(&self) {
        self.transition(SessionState::Disconnected);
        let listeners = self.state_listeners.read().clone();
        for listener in listeners {
            listener.on_disconnected(Some("connection reset"));
        }
    }

    pub fn transition(&self, new: SessionState) {
        let old = self.current.swap(new);
        let listeners = self.state_listeners.read().clone();
        for listener in listeners {
            listener.on_state_change(old, new);
        }
    }

    fn auto_reply(msg: &FixMessage, order_seq: u64) -> FixMessage {
        let mut reply = FixMessage::new("8");
        for tag in [
            mapper::TAG_CL_ORD_ID,
            mapper::TAG_ORIG_CL_ORD_ID,
            mapper::TAG_SYMBOL,
            mapper::TAG_SIDE,
        ] {
            if let Some(value) = msg.get_str(tag) {
                reply.set_field(tag, value);
            }
        }
        reply.set_field(mapper::TAG_TRANSACT_TIME, mapper::fix_timestamp());

        match msg.msg_type() {
            "D" => {
                let qty = msg.get_int(mapper::TAG_ORDER_QTY).unwrap_or(0);
                reply.set_field(mapper::TAG_EXEC_TYPE, mapper::EXEC_TYPE_NEW);
                reply.set_field(mapper::TAG_ORD_STATUS, mapper::ORD_STATUS_NEW);
                reply.set_field(mapper::TAG_ORDER_ID, format!("MOCK-{}", order_seq));
                reply.set_field(mapper::TAG_ORDER_QTY, qty);
                reply.set_field(mapper::TAG_CUM_QTY, 0);
                reply.set_field(mapper::TAG_LEAVES_QTY, qty);
                if let Some(price) = msg.get_int(mapper::TAG_PRICE) {
                    reply.set_field(mapper::TAG_PRICE, price);
                }
            }
            "F" => {
                reply.set_field(mapper::TAG_EXEC_TYPE, mapper::EXEC_TYPE_CANCELED);
                reply.set_field(mapper::TAG_ORD_STATUS, mapper::ORD_STATUS_CANCELED);
                reply.set_field(mapper::TAG_CUM_QTY, 0);
                reply.set_field(mapper::TAG_LEAVES_QTY, 0);
            }
            "G" => {
                reply.set_field(mapper::TAG_EXEC_TYPE, mapper::EXEC_TYPE_REPLACED);
                reply.set_field(mapper::TAG_ORD_STATUS, mapper::ORD_STATUS_REPLACED);
                if let Some(price) = msg.get_int(mapper::TAG_PRICE) {
                    reply.set_field(mapper::TAG_PRICE, price);
                }
                if let Some(qty) = msg.get_int(mapper::TAG_ORDER_QTY) {
                    reply.set_field(mapper::TAG_ORDER_QTY, qty);
                    reply.set_field(mapper::TAG_LEAVES_QTY, qty);
                    reply.set_field(mapper::TAG_CUM_QTY, 0);
                }
            }
            _ => {
                reply.set_field(mapper::TAG_EXEC_TYPE, mapper::EXEC_TYPE_NEW);
            }
        }
        reply
    }
}

impl Default for MockFixSession {
    fn default() -> Self {
        Self::new()
    }
}

impl FixSession for MockFixSession {
    fn try_claim(&self, _msg_type: &str) -> Option<u64> {
        if self.refuse_claims.load(Ordering::SeqCst) {
            None
        } else {
            Some(self.next_token.fetch_add(1, Ordering::SeqCst))
        }
    }

    fn commit_message(&self, _token: u64, msg: FixMessage) -> Result<()> {
        if self.fail_commit.load(Ordering::SeqCst) {
            bail!("mock engine commit failure");
        }
        self.sent.lock().push(msg.clone());

        if let Some(delay) = *self.auto_ack.lock() {
            let order_seq = self.next_order_seq.fetch_add(1, Ordering::SeqCst);
            let reply = Self::auto_reply(&msg, order_seq);
            let listeners = self.message_listeners.read().clone();
            std::thread::spawn(move || {
                std::thread::sleep(delay);
                for listener in listeners {
                    listener.on_message(&reply);
                }
            });
        }
        Ok(())
    }

    fn abort_message(&self, token: u64) {
        self.aborted.lock().push(token);
    }

    fn add_message_listener(&self, listener: Arc<dyn MessageListener>) {
        self.message_listeners.write().push(listener);
    }

    fn add_state_listener(&self, listener: Arc<dyn SessionStateListener>) {
        self.state_listeners.write().push(listener);
    }
}

pub struct MockFixEngine {
    session: Arc<MockFixSession>,
    started: AtomicBool,
    stopped: AtomicBool,
    fail_start: AtomicBool,
    logon_on_start: AtomicBool,
}

impl MockFixEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            session: Arc::new(MockFixSession::new()),
            started: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            fail_start: AtomicBool::new(false),
            logon_on_start: AtomicBool::new(false),
        })
    }

    pub fn session_handle(&self) -> Arc<MockFixSession> {
        Arc::clone(&self.session)
    }

    pub fn set_fail_start(&self, fail: bool) {
        self.fail_start.store(fail, Ordering::SeqCst);
    }

    /// Complete logon synchronously inside `start()`, for wiring tests that
    /// don't drive the session by hand.
    pub fn set_logon_on_start(&self, logon: bool) {
        self.logon_on_start.store(logon, Ordering::SeqCst);
    }

    pub fn started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    pub fn stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl FixEngine for MockFixEngine {
    fn start(&self) -> Result<()> {
        if self.fail_start.load(Ordering::SeqCst) {
            bail!("mock engine start failure");
        }
        self.started.store(true, Ordering::SeqCst);
        if self.logon_on_start.load(Ordering::SeqCst) {
            self.session.simulate_logon();
        }
        Ok(())
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    fn session(&self, _name: &str) -> Option<Arc<dyn FixSession>> {
        Some(Arc::clone(&self.session) as Arc<dyn FixSession>)
    }
}

/// Factory adapter handing out a pre-built mock engine regardless of config.
pub fn mock_engine_factory(engine: Arc<MockFixEngine>) -> crate::engine::EngineFactory {
    Box::new(move |_config| Ok(Arc::clone(&engine) as Arc<dyn FixEngine>))
}
