//! Shared stack wiring for integration tests.

use fixbridge::fix::{FixConfig, FixOrderStateTracker, FixOrderTransport, FixSessionManager};
use fixbridge::testing::{mock_engine_factory, MockFixEngine, MockFixSession};
use std::sync::Arc;
use std::time::Duration;

pub struct Stack {
    pub engine: Arc<MockFixEngine>,
    pub manager: Arc<FixSessionManager>,
    pub tracker: Arc<FixOrderStateTracker>,
    pub transport: Arc<FixOrderTransport>,
}

impl Stack {
    pub fn session(&self) -> Arc<MockFixSession> {
        self.engine.session_handle()
    }
}

/// Full FIX stack over the mock engine, started and logged on.
pub fn logged_on_stack(order_timeout: Duration) -> Stack {
    let engine = MockFixEngine::new();
    let config = FixConfig {
        sender_comp_id: "itest-key".to_string(),
        ..Default::default()
    };
    let manager = Arc::new(FixSessionManager::new(
        config,
        mock_engine_factory(Arc::clone(&engine)),
    ));
    let tracker = Arc::new(FixOrderStateTracker::new(order_timeout));
    manager.add_message_listener(Arc::clone(&tracker) as _);
    manager.start().unwrap();
    engine.session_handle().simulate_logon();

    let transport = Arc::new(FixOrderTransport::new(
        Arc::clone(&manager),
        Arc::clone(&tracker),
        order_timeout,
    ));

    Stack {
        engine,
        manager,
        tracker,
        transport,
    }
}
