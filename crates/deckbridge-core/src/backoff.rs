//! Reconnect delay policy.

use std::time::Duration;

/// Exponential backoff: `min(base * factor^attempt, cap)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    /// Delay before the first retry
    pub base: Duration,
    /// Growth per attempt
    pub factor: u32,
    /// Upper bound on any single delay
    pub cap: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self { base: Duration::from_millis(1000), factor: 2, cap: Duration::from_millis(30_000) }
    }
}

impl Backoff {
    /// Delay before retry number `attempt + 1`, where `attempt` is the count of
    /// consecutive failures so far.
    pub fn delay(&self, attempt: u32) -> Duration {
        let multiplier = self.factor.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base.checked_mul(multiplier).map_or(self.cap, |d| d.min(self.cap))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn default_schedule() {
        let backoff = Backoff::default();
        let delays: Vec<u128> = (0..7).map(|n| backoff.delay(n).as_millis()).collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 8000, 16_000, 30_000, 30_000]);
    }

    #[test]
    fn huge_attempts_saturate_at_cap() {
        let backoff = Backoff::default();
        assert_eq!(backoff.delay(u32::MAX), Duration::from_millis(30_000));
        assert_eq!(backoff.delay(40), Duration::from_millis(30_000));
    }

    proptest! {
        #[test]
        fn delay_is_monotonic_and_capped(attempt in 0u32..64) {
            let backoff = Backoff::default();
            let now = backoff.delay(attempt);
            let next = backoff.delay(attempt + 1);
            prop_assert!(now <= next);
            prop_assert!(next <= backoff.cap);
        }
    }
}
