//! Logging setup and transport counters.

pub mod logger;
pub mod metrics;

pub use logger::{init_logging, LogOptions};
pub use metrics::TransportMetrics;
