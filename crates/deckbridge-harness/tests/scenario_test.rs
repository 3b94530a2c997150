//! Session scenarios with declarative oracles.

use deckbridge_core::{Notice, SessionError, SessionState};
use deckbridge_harness::scenario::{OracleFn, Scenario, Step, oracle};
use deckbridge_proto::{Envelope, MessageType, Payload};

const URL: &str = "ws://deck.local:9000";

fn connect() -> Step {
    Step::Connect(URL.to_string())
}

#[test]
fn plain_connect_sends_handshake() {
    let result = Scenario::new("plain connect")
        .steps([connect(), Step::Open])
        .oracle(Box::new(|world| {
            assert_eq!(world.state(), SessionState::Connected);
            assert_eq!(world.handshakes(), 1);
            assert_eq!(world.notices(), vec![&Notice::Connected]);
            Ok(())
        }))
        .run();

    assert!(result.is_ok(), "scenario should succeed: {result:?}");
}

#[test]
fn inbound_action_is_dispatched() {
    let result = Scenario::new("inbound action")
        .steps([
            connect(),
            Step::Open,
            Step::Receive(
                r#"{"type":"action","data":{"id":"a1","type":"toggle","displayText":"Mute","isToggled":true}}"#
                    .into(),
            ),
        ])
        .oracle(Box::new(|world| {
            let dispatched = world.dispatched();
            let [Payload::Action(action)] = dispatched.as_slice() else {
                return Err(format!("expected one action, got {dispatched:?}"));
            };
            assert_eq!(action.id, "a1");
            assert_eq!(action.is_toggled, Some(true));
            Ok(())
        }))
        .run();

    assert!(result.is_ok(), "scenario should succeed: {result:?}");
}

#[test]
fn action_with_mistyped_gauge_is_still_dispatched() {
    let result = Scenario::new("loose gauge")
        .steps([
            connect(),
            Step::Open,
            Step::Receive(
                r#"{"type":"action","data":{"id":"cpu","type":"gauge","displayText":"CPU","gaugeValue":"50"}}"#
                    .into(),
            ),
        ])
        .oracle(Box::new(|world| {
            let dispatched = world.dispatched();
            let [Payload::Action(action)] = dispatched.as_slice() else {
                return Err(format!("expected one action, got {dispatched:?}"));
            };
            assert_eq!(action.gauge_value, None);
            assert_eq!(action.extra["gaugeValue"], "50");
            Ok(())
        }))
        .run();

    assert!(result.is_ok(), "scenario should succeed: {result:?}");
}

#[test]
fn bogus_type_is_dropped_without_error() {
    let no_errors: OracleFn = Box::new(|world| {
        let errors = world.notices().into_iter().filter(|n| matches!(n, Notice::Error(_)));
        assert_eq!(errors.count(), 0);
        Ok(())
    });

    let result = Scenario::new("bogus type")
        .steps([connect(), Step::Open, Step::Receive(r#"{"type":"bogus","data":{}}"#.into())])
        .oracle(oracle::all_of(vec![
            oracle::dispatched_count(0),
            oracle::in_state(SessionState::Connected),
            no_errors,
        ]))
        .run();

    assert!(result.is_ok(), "scenario should succeed: {result:?}");
}

#[test]
fn profile_and_config_are_dispatched() {
    let result = Scenario::new("profile and config")
        .steps([
            connect(),
            Step::Open,
            Step::Receive(
                r#"{"type":"profile","data":{"id":"p1","name":"Main","rows":3,"columns":5}}"#.into(),
            ),
            Step::Receive(
                r#"{"type":"config","data":{"serverUrl":"ws://other:1","clientName":"deck","version":"2"}}"#
                    .into(),
            ),
            Step::Receive(
                r#"{"type":"config","data":{"serverUrl":"","clientName":"deck","version":"2"}}"#
                    .into(),
            ),
        ])
        .oracle(Box::new(|world| {
            let kinds: Vec<MessageType> =
                world.dispatched().iter().map(|p| p.message_type()).collect();
            assert_eq!(kinds, vec![MessageType::Profile, MessageType::Config]);
            Ok(())
        }))
        .run();

    assert!(result.is_ok(), "scenario should succeed: {result:?}");
}

#[test]
fn full_backoff_schedule_then_give_up() {
    let mut steps = vec![connect(), Step::Open, Step::Close];
    for _ in 0..5 {
        steps.push(Step::RetryFires);
        steps.push(Step::Fail("refused".into()));
    }

    let result = Scenario::new("exhaustion")
        .steps(steps)
        .oracle(oracle::all_of(vec![
            oracle::retry_delays_ms(vec![1000, 2000, 4000, 8000, 16_000]),
            oracle::in_state(SessionState::Idle),
            oracle::no_retry_pending(),
            oracle::exhausted_once(),
        ]))
        .run();

    assert!(result.is_ok(), "scenario should succeed: {result:?}");
}

#[test]
fn recovery_restores_full_budget() {
    let result = Scenario::new("recovery")
        .steps([
            connect(),
            Step::Open,
            Step::Close,
            Step::RetryFires,
            Step::Fail("refused".into()),
            Step::RetryFires,
            Step::Open,
            Step::Close,
        ])
        .oracle(oracle::all_of(vec![
            oracle::retry_delays_ms(vec![1000, 2000, 1000]),
            oracle::in_state(SessionState::Reconnecting),
        ]))
        .run();

    assert!(result.is_ok(), "scenario should succeed: {result:?}");
}

#[test]
fn disconnect_while_reconnecting_cancels_timer() {
    let single_open: OracleFn = Box::new(|world| {
        assert_eq!(world.opens(), 1, "the cancelled retry must not reopen");
        Ok(())
    });

    let result = Scenario::new("disconnect during backoff")
        .steps([connect(), Step::Open, Step::Close, Step::Disconnect, Step::RetryFires])
        .oracle(oracle::all_of(vec![
            oracle::in_state(SessionState::Idle),
            oracle::no_retry_pending(),
            single_open,
        ]))
        .run();

    assert!(result.is_ok(), "scenario should succeed: {result:?}");
}

#[test]
fn send_before_connect_is_rejected() {
    let envelope = Envelope::new("action", serde_json::json!({"id": "a1"}));
    let result = Scenario::new("early send")
        .steps([
            Step::Send(envelope.clone()),
            connect(),
            Step::Send(envelope.clone()),
            Step::Open,
            Step::Send(envelope),
        ])
        .oracle(Box::new(|world| {
            assert_eq!(
                world.send_errors(),
                &[
                    SessionError::NotConnected { state: SessionState::Idle },
                    SessionError::NotConnected { state: SessionState::Connecting },
                ]
            );
            assert_eq!(world.sent_text().len(), 1);
            Ok(())
        }))
        .run();

    assert!(result.is_ok(), "scenario should succeed: {result:?}");
}
