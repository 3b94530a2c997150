//! Environment abstraction.
//!
//! Production reads the system clock and sleeps on the tokio timer; the
//! simulation harness substitutes virtual time so backoff schedules can be
//! asserted to the millisecond.

use std::{future::Future, time::Duration};

/// Source of wall-clock time and delays.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Wall-clock time in milliseconds since the Unix epoch.
    ///
    /// Used to stamp persisted records.
    fn unix_millis(&self) -> u64;

    /// Suspend for `duration`.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}
