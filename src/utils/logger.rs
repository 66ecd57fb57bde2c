//! Logging setup for the transport stack.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Output options for the transport's tracing setup.
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Base level directive, e.g. "info". `RUST_LOG` overrides when set.
    pub level: String,
    /// Emit JSON lines instead of the human-readable format.
    pub json: bool,
    /// Raise this crate's FIX modules to debug so per-message traffic
    /// (ExecutionReport dispatch, outbound sends, ignored MsgTypes) is
    /// visible without turning the whole process noisy.
    pub wire_debug: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            wire_debug: false,
        }
    }
}

pub fn init_logging(options: &LogOptions) {
    let mut directives = options.level.clone();
    if options.wire_debug {
        directives.push_str(",fixbridge::fix=debug");
    }
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    let fmt_layer = if options.json {
        fmt::layer().json().boxed()
    } else {
        fmt::layer().with_target(true).with_thread_ids(true).boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
