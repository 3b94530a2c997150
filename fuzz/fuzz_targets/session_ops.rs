#![no_main]

use deckbridge_core::{Session, SessionAction, SessionConfig, SessionInput, SessionState};
use deckbridge_harness::Operation;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|ops: Vec<Operation>| {
    let config = SessionConfig::default();
    let mut session = Session::new(config.clone());
    let mut last_opened = None;

    for op in ops {
        let inputs = match (op, last_opened) {
            (Operation::Connect, _) => vec![SessionInput::Connect { url: "ws://fuzz".into() }],
            (Operation::Disconnect, _) => vec![SessionInput::Disconnect],
            (Operation::Open, Some(conn)) => vec![SessionInput::TransportOpened { conn }],
            (Operation::Fail, Some(conn)) => vec![
                SessionInput::TransportError { conn, reason: "fuzz".into() },
                SessionInput::TransportClosed { conn },
            ],
            (Operation::Close, Some(conn)) => vec![SessionInput::TransportClosed { conn }],
            (Operation::RetryFires, _) if session.retry_pending() => vec![SessionInput::RetryElapsed],
            (Operation::StaleClose, _) => vec![SessionInput::TransportClosed { conn: 0 }],
            _ => vec![],
        };

        for input in inputs {
            for action in session.handle(input) {
                if let SessionAction::Open { conn, .. } = action {
                    last_opened = Some(conn);
                }
            }
        }

        assert!(session.reconnect_attempts() <= config.max_reconnect_attempts);
        match session.state() {
            SessionState::Idle => {
                assert!(!session.retry_pending());
                assert!(session.active_connection().is_none());
            },
            SessionState::Connected | SessionState::Connecting => {
                assert!(session.active_connection().is_some());
            },
            SessionState::Reconnecting => {
                assert!(session.retry_pending());
                assert!(session.active_connection().is_none());
            },
        }
    }
});
