//! Process-wide producer counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by every worker of a producer process.
///
/// Purely informational: nothing in the send path depends on them.
#[derive(Debug, Default)]
pub struct ProducerMetrics {
    frames_sent: AtomicU64,
    timestamps_sent: AtomicU64,
}

impl ProducerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one fully written frame.
    pub fn record_frame_sent(&self) {
        self.frames_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one timestamp accepted by the sink.
    pub fn record_timestamp_sent(&self) {
        self.timestamps_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Frames written by all workers so far.
    pub fn frames_sent(&self) -> u64 {
        self.frames_sent.load(Ordering::Relaxed)
    }

    /// Timestamps delivered by all workers so far.
    pub fn timestamps_sent(&self) -> u64 {
        self.timestamps_sent.load(Ordering::Relaxed)
    }
}
