//! Wiring for the FIX order path.
//!
//! Called once at application startup: builds the session manager, tracker
//! and transport per the configured mode, starts the session and waits
//! briefly for logon. A config that cannot support FIX (no sender comp id)
//! degrades to the supplied REST transport with a warning instead of failing
//! startup.

use crate::engine::EngineFactory;
use crate::fix::config::{FixConfig, TransportMode};
use crate::fix::session::FixSessionManager;
use crate::fix::tracker::{FixOrderStateTracker, OrderUpdateSink};
use crate::fix::transport::FixOrderTransport;
use crate::transport::{FallbackTransport, OrderTransport};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// How long startup waits for the initial logon before carrying on.
const LOGON_WAIT: Duration = Duration::from_secs(10);

/// The built transport plus the session-side pieces the host application
/// must keep alive: the manager for shutdown and the tracker for the
/// periodic stale sweep.
pub struct FixTransportHandle {
    transport: Arc<dyn OrderTransport>,
    session_manager: Option<Arc<FixSessionManager>>,
    tracker: Option<Arc<FixOrderStateTracker>>,
}

impl FixTransportHandle {
    fn rest_only(rest: Arc<dyn OrderTransport>) -> Self {
        Self {
            transport: rest,
            session_manager: None,
            tracker: None,
        }
    }

    pub fn transport(&self) -> Arc<dyn OrderTransport> {
        Arc::clone(&self.transport)
    }

    pub fn session_manager(&self) -> Option<&Arc<FixSessionManager>> {
        self.session_manager.as_ref()
    }

    /// Drive [`FixOrderStateTracker::cleanup_stale`] from the host's
    /// scheduler, once per second or so.
    pub fn tracker(&self) -> Option<&Arc<FixOrderStateTracker>> {
        self.tracker.as_ref()
    }

    /// Stop the FIX session if one was started. Idempotent.
    pub fn shutdown(&self) {
        if let Some(manager) = &self.session_manager {
            manager.stop();
        }
    }
}

/// Build the order transport for the configured mode and start the FIX
/// session when one is needed.
pub fn build_transport(
    config: &FixConfig,
    engine_factory: EngineFactory,
    rest_transport: Arc<dyn OrderTransport>,
    update_sink: Option<OrderUpdateSink>,
) -> Result<FixTransportHandle> {
    build_transport_with_logon_wait(config, engine_factory, rest_transport, update_sink, LOGON_WAIT)
}

/// As [`build_transport`] with an explicit logon wait; used by tests.
pub fn build_transport_with_logon_wait(
    config: &FixConfig,
    engine_factory: EngineFactory,
    rest_transport: Arc<dyn OrderTransport>,
    update_sink: Option<OrderUpdateSink>,
    logon_wait: Duration,
) -> Result<FixTransportHandle> {
    if config.transport_mode == TransportMode::Rest {
        info!("transport mode: REST");
        return Ok(FixTransportHandle::rest_only(rest_transport));
    }

    if let Err(reason) = config.validate() {
        warn!(reason = %reason, "FIX config invalid, staying on REST");
        return Ok(FixTransportHandle::rest_only(rest_transport));
    }

    let session_manager = Arc::new(FixSessionManager::new(config.clone(), engine_factory));
    let tracker = Arc::new(FixOrderStateTracker::new(config.order_timeout()));

    // The tracker must see every inbound message from the first one on.
    session_manager.add_message_listener(Arc::clone(&tracker) as _);
    if let Some(sink) = update_sink {
        tracker.set_update_sink(sink);
        info!("order update sink wired for post-ack reports");
    }

    let fix_transport = Arc::new(FixOrderTransport::new(
        Arc::clone(&session_manager),
        Arc::clone(&tracker),
        config.order_timeout(),
    ));

    let transport: Arc<dyn OrderTransport> = match config.transport_mode {
        TransportMode::Fix => {
            info!("transport mode: FIX only");
            fix_transport
        }
        _ => {
            info!("transport mode: FIX with REST fallback");
            Arc::new(FallbackTransport::new(fix_transport, rest_transport))
        }
    };

    session_manager.start()?;

    if session_manager.await_logon(logon_wait) {
        info!("FIX session logged on");
    } else if config.transport_mode == TransportMode::Fix {
        warn!(
            "FIX session logon timeout after {:?}; orders will fail until connected",
            logon_wait
        );
    } else {
        warn!(
            "FIX session logon timeout after {:?}; REST fallback will serve until connected",
            logon_wait
        );
    }

    Ok(FixTransportHandle {
        transport,
        session_manager: Some(session_manager),
        tracker: Some(tracker),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{mock_engine_factory, MockFixEngine, MockRestTransport};
    use crate::transport::TransportKind;

    fn config(mode: TransportMode) -> FixConfig {
        FixConfig {
            sender_comp_id: "test-key".to_string(),
            transport_mode: mode,
            ..Default::default()
        }
    }

    #[test]
    fn test_rest_mode_passes_rest_through() {
        let engine = MockFixEngine::new();
        let rest = Arc::new(MockRestTransport::new());
        let handle = build_transport(
            &config(TransportMode::Rest),
            mock_engine_factory(Arc::clone(&engine)),
            rest,
            None,
        )
        .unwrap();

        assert_eq!(handle.transport().kind(), TransportKind::Rest);
        assert!(handle.session_manager().is_none());
        assert!(!engine.started());
    }

    #[test]
    fn test_missing_sender_comp_id_stays_on_rest() {
        let engine = MockFixEngine::new();
        let rest = Arc::new(MockRestTransport::new());
        let bad_config = FixConfig {
            transport_mode: TransportMode::Fix,
            ..Default::default()
        };
        let handle = build_transport(
            &bad_config,
            mock_engine_factory(Arc::clone(&engine)),
            rest,
            None,
        )
        .unwrap();

        assert_eq!(handle.transport().kind(), TransportKind::Rest);
        assert!(!engine.started());
    }

    #[test]
    fn test_fix_mode_starts_session() {
        let engine = MockFixEngine::new();
        engine.set_logon_on_start(true);
        let rest = Arc::new(MockRestTransport::new());
        let handle = build_transport(
            &config(TransportMode::Fix),
            mock_engine_factory(Arc::clone(&engine)),
            rest,
            None,
        )
        .unwrap();

        assert!(engine.started());
        assert!(handle.transport().is_available());
        assert_eq!(handle.transport().kind(), TransportKind::Fix);
        assert!(handle.tracker().is_some());

        handle.shutdown();
        assert!(engine.stopped());
    }

    #[test]
    fn test_fallback_mode_survives_logon_timeout() {
        let engine = MockFixEngine::new(); // never logs on
        let rest = Arc::new(MockRestTransport::new());
        let handle = build_transport_with_logon_wait(
            &config(TransportMode::FixWithRestFallback),
            mock_engine_factory(Arc::clone(&engine)),
            rest,
            None,
            Duration::from_millis(20),
        )
        .unwrap();

        // FIX never came up: the fallback serves and reports REST.
        assert!(handle.transport().is_available());
        assert_eq!(handle.transport().kind(), TransportKind::Rest);
    }

    #[test]
    fn test_engine_start_failure_propagates() {
        let engine = MockFixEngine::new();
        engine.set_fail_start(true);
        let rest = Arc::new(MockRestTransport::new());
        let result = build_transport(
            &config(TransportMode::Fix),
            mock_engine_factory(engine),
            rest,
            None,
        );
        assert!(result.is_err());
    }
}
