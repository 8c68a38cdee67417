//! Frame counter and per-run statistics.

use matrixflow_common::PublishOutcome;

/// What to do with a correctly sized frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Even counter: log, transform and publish.
    Process { frame: u64 },
    /// Odd counter: discard without any processing.
    Drop { frame: u64 },
}

/// Snapshot of the relay counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    pub connections: u64,
    pub discarded: u64,
    pub dropped: u64,
    pub processed: u64,
    pub publish_failures: u64,
    pub log_failures: u64,
}

/// State carried across connections for the lifetime of the relay.
///
/// The frame counter only moves for frames of the expected size. A
/// discarded short frame leaves the parity untouched.
#[derive(Debug, Default)]
pub struct RelaySession {
    frame_counter: u64,
    stats: RelayStats,
}

impl RelaySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of correctly sized frames seen so far.
    pub fn frame_counter(&self) -> u64 {
        self.frame_counter
    }

    pub fn stats(&self) -> RelayStats {
        self.stats
    }

    pub fn record_connection(&mut self) {
        self.stats.connections += 1;
    }

    pub fn record_discard(&mut self) {
        self.stats.discarded += 1;
    }

    pub fn record_log_failure(&mut self) {
        self.stats.log_failures += 1;
    }

    /// Apply the parity filter to a correctly sized frame.
    ///
    /// A dropped frame advances the counter immediately. An admitted frame
    /// advances it in [`complete`](Self::complete), once publishing is done.
    pub fn admit(&mut self) -> Admission {
        let frame = self.frame_counter;
        if frame % 2 == 1 {
            self.frame_counter += 1;
            self.stats.dropped += 1;
            Admission::Drop { frame }
        } else {
            Admission::Process { frame }
        }
    }

    /// Finish an admitted frame.
    pub fn complete(&mut self, publish: &PublishOutcome) {
        self.frame_counter += 1;
        self.stats.processed += 1;
        if !publish.is_delivered() {
            self.stats.publish_failures += 1;
        }
    }
}
