//! Production environment.

use std::{
    future::Future,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use deckbridge_core::Environment;

/// System clock and tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl Environment for SystemEnv {
    #[allow(clippy::disallowed_methods)]
    fn unix_millis(&self) -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.as_millis() as u64)
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_is_past_2020() {
        assert!(SystemEnv.unix_millis() > 1_577_836_800_000);
    }

    #[tokio::test(start_paused = true)]
    async fn sleep_follows_tokio_time() {
        let start = tokio::time::Instant::now();
        SystemEnv.sleep(Duration::from_secs(30)).await;
        assert_eq!(start.elapsed(), Duration::from_secs(30));
    }
}
