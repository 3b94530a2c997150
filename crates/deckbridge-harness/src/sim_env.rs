//! Virtual-time environment.

use std::{future::Future, time::Duration};

use deckbridge_core::Environment;
use tokio::time::Instant;

/// Wall clock used when none is given: 2024-01-01T00:00:00Z.
pub const DEFAULT_EPOCH_MS: u64 = 1_704_067_200_000;

/// Environment driven by tokio's clock.
///
/// Under a paused tokio clock or turmoil, time only moves when the runtime
/// advances it, so backoff delays and record timestamps are exact.
#[derive(Debug, Clone, Copy)]
pub struct SimEnv {
    epoch_ms: u64,
    start: Instant,
}

impl SimEnv {
    /// Environment whose wall clock starts at [`DEFAULT_EPOCH_MS`].
    pub fn new() -> Self {
        Self::with_epoch(DEFAULT_EPOCH_MS)
    }

    /// Environment whose wall clock starts at `epoch_ms`.
    pub fn with_epoch(epoch_ms: u64) -> Self {
        Self { epoch_ms, start: Instant::now() }
    }

    /// Virtual time since construction.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for SimEnv {
    fn unix_millis(&self) -> u64 {
        self.epoch_ms + self.start.elapsed().as_millis() as u64
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}
