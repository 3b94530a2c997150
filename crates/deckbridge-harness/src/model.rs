//! Reference model of the session lifecycle.
//!
//! A deliberately naive restatement of the connection and reconnect rules,
//! with no connection ids and no action lists. Model-based tests drive the
//! real [`deckbridge_core::Session`] and this model with the same operation
//! sequence and compare [`ObservableState`] after every step.

use arbitrary::Arbitrary;
use deckbridge_core::SessionState;

/// Operations both the model and the real session understand.
///
/// Socket operations target the current socket; when there is none they are
/// no-ops in both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum Operation {
    /// Caller connects
    Connect,
    /// Caller disconnects
    Disconnect,
    /// Current socket finishes opening
    Open,
    /// Current socket errors, then closes
    Fail,
    /// Current socket closes
    Close,
    /// Pending retry timer fires
    RetryFires,
    /// A socket torn down earlier reports a close
    StaleClose,
}

/// What both implementations must agree on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservableState {
    /// Lifecycle state
    pub state: SessionState,
    /// Consecutive failed reconnects
    pub attempts: u32,
    /// Delay of the armed retry timer, if any
    pub retry_delay_ms: Option<u64>,
    /// Whether a socket is open or opening
    pub has_socket: bool,
    /// `connected` notices so far
    pub connected_events: u32,
    /// `disconnected` notices so far
    pub disconnected_events: u32,
    /// Times the retry budget ran out
    pub exhausted_events: u32,
}

/// Reference session.
#[derive(Debug, Clone)]
pub struct ModelSession {
    max_attempts: u32,
    observed: ObservableState,
}

impl ModelSession {
    /// Model with the default retry budget.
    pub fn new() -> Self {
        Self::with_max_attempts(5)
    }

    /// Model giving up after `max_attempts` failed reconnects.
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            observed: ObservableState {
                state: SessionState::Idle,
                attempts: 0,
                retry_delay_ms: None,
                has_socket: false,
                connected_events: 0,
                disconnected_events: 0,
                exhausted_events: 0,
            },
        }
    }

    /// Current observable state.
    pub fn observable_state(&self) -> ObservableState {
        self.observed
    }

    /// Apply one operation.
    pub fn apply(&mut self, op: Operation) {
        let s = &mut self.observed;
        match op {
            Operation::Connect => {
                if s.state == SessionState::Connected {
                    s.disconnected_events += 1;
                }
                s.retry_delay_ms = None;
                s.attempts = 0;
                s.has_socket = true;
                s.state = SessionState::Connecting;
            },
            Operation::Disconnect => {
                if s.state == SessionState::Connected {
                    s.disconnected_events += 1;
                }
                s.retry_delay_ms = None;
                s.has_socket = false;
                s.state = SessionState::Idle;
            },
            Operation::Open => {
                if s.has_socket && s.state == SessionState::Connecting {
                    s.state = SessionState::Connected;
                    s.attempts = 0;
                    s.connected_events += 1;
                }
            },
            Operation::Fail | Operation::Close => {
                if !s.has_socket {
                    return;
                }
                s.has_socket = false;
                if s.state == SessionState::Connected {
                    s.disconnected_events += 1;
                }
                if s.attempts >= self.max_attempts {
                    s.state = SessionState::Idle;
                    s.retry_delay_ms = None;
                    s.exhausted_events += 1;
                } else {
                    s.state = SessionState::Reconnecting;
                    s.retry_delay_ms = Some(backoff_ms(s.attempts));
                }
            },
            Operation::RetryFires => {
                if s.state == SessionState::Reconnecting && s.retry_delay_ms.is_some() {
                    s.retry_delay_ms = None;
                    s.attempts += 1;
                    s.has_socket = true;
                    s.state = SessionState::Connecting;
                }
            },
            Operation::StaleClose => {},
        }
    }
}

impl Default for ModelSession {
    fn default() -> Self {
        Self::new()
    }
}

/// `min(1000 * 2^attempts, 30000)`
fn backoff_ms(attempts: u32) -> u64 {
    if attempts >= 5 { 30_000 } else { (1000u64 << attempts).min(30_000) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_while_connected_schedules_first_retry() {
        let mut model = ModelSession::new();
        model.apply(Operation::Connect);
        model.apply(Operation::Open);
        model.apply(Operation::Close);

        let s = model.observable_state();
        assert_eq!(s.state, SessionState::Reconnecting);
        assert_eq!(s.retry_delay_ms, Some(1000));
        assert_eq!(s.disconnected_events, 1);
    }

    #[test]
    fn budget_runs_out() {
        let mut model = ModelSession::new();
        model.apply(Operation::Connect);
        model.apply(Operation::Close);
        for _ in 0..5 {
            model.apply(Operation::RetryFires);
            model.apply(Operation::Close);
        }

        let s = model.observable_state();
        assert_eq!(s.state, SessionState::Idle);
        assert_eq!(s.exhausted_events, 1);
        assert_eq!(s.attempts, 5);
    }

    #[test]
    fn backoff_matches_schedule() {
        let delays: Vec<u64> = (0..7).map(backoff_ms).collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 8000, 16_000, 30_000, 30_000]);
    }
}
