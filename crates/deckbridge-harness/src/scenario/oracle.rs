//! Reusable oracle functions.

use std::time::Duration;

use deckbridge_core::{Notice, SessionError, SessionState};

use crate::scenario::OracleFn;

/// Session ends in `expected`.
pub fn in_state(expected: SessionState) -> OracleFn {
    Box::new(move |world| {
        let actual = world.state();
        if actual == expected {
            Ok(())
        } else {
            Err(format!("expected state {expected:?}, got {actual:?}"))
        }
    })
}

/// Retry timers were armed with exactly these delays, in milliseconds.
pub fn retry_delays_ms(expected: Vec<u64>) -> OracleFn {
    Box::new(move |world| {
        let expected: Vec<Duration> = expected.iter().map(|ms| Duration::from_millis(*ms)).collect();
        let actual = world.retry_delays();
        if actual == expected {
            Ok(())
        } else {
            Err(format!("expected retry delays {expected:?}, got {actual:?}"))
        }
    })
}

/// No retry timer is armed at the end.
pub fn no_retry_pending() -> OracleFn {
    Box::new(|world| {
        if world.session().retry_pending() {
            Err("retry timer still armed".to_string())
        } else {
            Ok(())
        }
    })
}

/// Exactly `expected` payloads were dispatched.
pub fn dispatched_count(expected: usize) -> OracleFn {
    Box::new(move |world| {
        let actual = world.dispatched().len();
        if actual == expected {
            Ok(())
        } else {
            Err(format!("expected {expected} dispatched payloads, got {actual}"))
        }
    })
}

/// The retry budget ran out exactly once.
pub fn exhausted_once() -> OracleFn {
    Box::new(|world| {
        let count = world
            .notices()
            .iter()
            .filter(|n| matches!(n, Notice::Error(SessionError::ReconnectExhausted { .. })))
            .count();
        if count == 1 {
            Ok(())
        } else {
            Err(format!("expected one exhausted notice, got {count}"))
        }
    })
}

/// Every oracle passes. Stops at the first failure.
pub fn all_of(oracles: Vec<OracleFn>) -> OracleFn {
    Box::new(move |world| {
        for oracle in &oracles {
            oracle(world)?;
        }
        Ok(())
    })
}
