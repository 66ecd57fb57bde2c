//! Lifecycle owner of the exchange FIX session.
//!
//! Wraps the engine seam: builds the engine config, constructs the engine via
//! an injected factory, attaches listeners, and caches the session state so
//! `is_logged_on()` is a cheap atomic read from any thread. Reconnection is
//! the engine's job; this manager only relays the resulting state
//! transitions. Pending requests outstanding across a disconnect are not
//! drained here; the tracker's stale sweep owns their timeout.
//!
//! Listener registration must happen before [`FixSessionManager::start`];
//! the logon readiness signal is armed inside `start` and opened by the
//! engine's logon callback.

use crate::engine::{
    EngineFactory, FixEngine, FixSession, MessageListener, SessionState, SessionStateListener,
};
use crate::fix::config::{FixConfig, SESSION_NAME};
use anyhow::{anyhow, Result};
use crossbeam::atomic::AtomicCell;
use parking_lot::{Condvar, Mutex, RwLock};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// One-shot readiness signal, re-armed on every `start`.
struct LogonLatch {
    opened: Mutex<bool>,
    cv: Condvar,
}

impl LogonLatch {
    fn new() -> Self {
        Self {
            opened: Mutex::new(false),
            cv: Condvar::new(),
        }
    }

    fn arm(&self) {
        *self.opened.lock() = false;
    }

    fn open(&self) {
        let mut opened = self.opened.lock();
        *opened = true;
        self.cv.notify_all();
    }

    fn wait(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut opened = self.opened.lock();
        while !*opened {
            if self.cv.wait_until(&mut opened, deadline).timed_out() {
                return *opened;
            }
        }
        true
    }
}

/// State shared with the engine's callback thread: the cached session state,
/// the logon latch, and downstream state listeners. Registered with the
/// session as its state listener.
struct SessionCore {
    state: AtomicCell<SessionState>,
    state_listeners: RwLock<Vec<Arc<dyn SessionStateListener>>>,
    logon_latch: LogonLatch,
}

impl SessionCore {
    fn new() -> Self {
        Self {
            state: AtomicCell::new(SessionState::Created),
            state_listeners: RwLock::new(Vec::new()),
            logon_latch: LogonLatch::new(),
        }
    }

    /// Fan out to registered listeners in registration order. A panicking
    /// listener is logged and skipped, never propagated.
    fn each_listener(&self, f: impl Fn(&dyn SessionStateListener)) {
        for listener in self.state_listeners.read().iter() {
            if catch_unwind(AssertUnwindSafe(|| f(listener.as_ref()))).is_err() {
                error!("session state listener panicked");
            }
        }
    }
}

impl SessionStateListener for SessionCore {
    fn on_state_change(&self, old: SessionState, new: SessionState) {
        self.state.store(new);
        info!(%old, %new, "FIX session state change");
        self.each_listener(|l| l.on_state_change(old, new));
    }

    fn on_logon(&self) {
        info!("FIX session logged on");
        self.state.store(SessionState::LoggedOn);
        self.logon_latch.open();
        self.each_listener(|l| l.on_logon());
    }

    fn on_logout(&self, reason: &str) {
        warn!(reason, "FIX session logged out");
        self.each_listener(|l| l.on_logout(reason));
    }

    fn on_disconnected(&self, cause: Option<&str>) {
        warn!(cause = cause.unwrap_or("unknown"), "FIX session disconnected");
        self.each_listener(|l| l.on_disconnected(cause));
    }

    fn on_error(&self, err: &str) {
        error!(error = err, "FIX session error");
        self.each_listener(|l| l.on_error(err));
    }
}

pub struct FixSessionManager {
    config: FixConfig,
    engine_factory: EngineFactory,
    engine: RwLock<Option<Arc<dyn FixEngine>>>,
    session: RwLock<Option<Arc<dyn FixSession>>>,
    core: Arc<SessionCore>,
    message_listeners: RwLock<Vec<Arc<dyn MessageListener>>>,
}

impl FixSessionManager {
    pub fn new(config: FixConfig, engine_factory: EngineFactory) -> Self {
        Self {
            config,
            engine_factory,
            engine: RwLock::new(None),
            session: RwLock::new(None),
            core: Arc::new(SessionCore::new()),
            message_listeners: RwLock::new(Vec::new()),
        }
    }

    /// Register an inbound-message listener. Listeners registered before
    /// `start` are attached to the session during `start`; later ones are
    /// attached immediately when a session exists.
    pub fn add_message_listener(&self, listener: Arc<dyn MessageListener>) {
        self.message_listeners.write().push(Arc::clone(&listener));
        if let Some(session) = self.session.read().as_ref() {
            session.add_message_listener(listener);
        }
    }

    pub fn add_state_listener(&self, listener: Arc<dyn SessionStateListener>) {
        self.core.state_listeners.write().push(listener);
    }

    /// Build the engine and start connecting. From this point the engine
    /// autonomously connects, logs on, and re-initiates after disconnects.
    pub fn start(&self) -> Result<()> {
        info!(
            host = self.config.host(),
            port = self.config.port,
            target_comp_id = %self.config.target_comp_id,
            "starting FIX session manager"
        );

        let engine_config = self.config.engine_config();
        let engine = (self.engine_factory)(&engine_config)?;

        let session = engine
            .session(SESSION_NAME)
            .ok_or_else(|| anyhow!("engine has no session named {}", SESSION_NAME))?;

        session.add_state_listener(Arc::clone(&self.core) as Arc<dyn SessionStateListener>);
        for listener in self.message_listeners.read().iter() {
            session.add_message_listener(Arc::clone(listener));
        }

        *self.session.write() = Some(session);
        *self.engine.write() = Some(Arc::clone(&engine));

        self.core.logon_latch.arm();
        engine.start()?;

        info!(
            host = self.config.host(),
            port = self.config.port,
            "FIX engine started, connecting"
        );
        Ok(())
    }

    /// Block until the session is logged on, up to `timeout`. False on
    /// timeout.
    pub fn await_logon(&self, timeout: Duration) -> bool {
        self.core.logon_latch.wait(timeout)
    }

    /// Stop the engine and drop the session handle. Idempotent.
    pub fn stop(&self) {
        info!("stopping FIX session manager");
        if let Some(engine) = self.engine.write().take() {
            engine.stop();
        }
        *self.session.write() = None;
    }

    /// True when application messages can be sent right now.
    pub fn is_logged_on(&self) -> bool {
        self.core.state.load() == SessionState::LoggedOn
    }

    pub fn state(&self) -> SessionState {
        self.core.state.load()
    }

    pub fn session(&self) -> Option<Arc<dyn FixSession>> {
        self.session.read().clone()
    }
}
