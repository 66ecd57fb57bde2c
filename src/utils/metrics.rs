//! Transport counters for monitoring.

use std::sync::atomic::{AtomicU64, Ordering};

/// Lifetime counters for one FIX transport instance. Plain atomics so the
/// inbound thread and caller threads can record without locking.
#[derive(Debug, Default)]
pub struct TransportMetrics {
    pub creates_sent: AtomicU64,
    pub cancels_sent: AtomicU64,
    pub amends_sent: AtomicU64,
    pub acks: AtomicU64,
    pub rejects: AtomicU64,
    pub timeouts: AtomicU64,
    pub unavailable: AtomicU64,
}

impl TransportMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_create_sent(&self) {
        self.creates_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cancel_sent(&self) {
        self.cancels_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_amend_sent(&self) {
        self.amends_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ack(&self) {
        self.acks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reject(&self) {
        self.rejects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unavailable(&self) {
        self.unavailable.fetch_add(1, Ordering::Relaxed);
    }

    pub fn sent_total(&self) -> u64 {
        self.creates_sent.load(Ordering::Relaxed)
            + self.cancels_sent.load(Ordering::Relaxed)
            + self.amends_sent.load(Ordering::Relaxed)
    }

    /// Acks per sent request, 0.0 before any traffic.
    pub fn ack_rate(&self) -> f64 {
        let sent = self.sent_total();
        if sent == 0 {
            return 0.0;
        }
        self.acks.load(Ordering::Relaxed) as f64 / sent as f64
    }
}
