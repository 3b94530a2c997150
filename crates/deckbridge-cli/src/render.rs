//! Text rendering of events and records.

use deckbridge_client::ClientEvent;
use deckbridge_core::SessionState;
use deckbridge_proto::{Action, ActionKind};
use serde::Serialize;

/// One line describing `event`.
pub fn event(event: &ClientEvent) -> String {
    match event {
        ClientEvent::Connected => "* connected".to_string(),
        ClientEvent::Disconnected => "* disconnected".to_string(),
        ClientEvent::Error(e) => format!("! {e}"),
        ClientEvent::Action(stored) => format!("action {}", action(&stored.record)),
        ClientEvent::Config(stored) => format!(
            "config {} as {} v{}",
            stored.record.server_url, stored.record.client_name, stored.record.version
        ),
        ClientEvent::Profile(profile) => format!(
            "profile {} \"{}\" {}x{}, {} actions",
            profile.id,
            profile.name,
            profile.rows,
            profile.columns,
            profile.actions.len()
        ),
    }
}

/// Summary of an action: id, kind, label and kind-specific state.
pub fn action(action: &Action) -> String {
    let mut line = format!("{} [{}] {}", action.id, kind_name(action.kind), action.display_text);

    match action.kind {
        ActionKind::Toggle => {
            let on = action.is_toggled.unwrap_or(false);
            line.push_str(if on { " (on)" } else { " (off)" });
        },
        ActionKind::Gauge => {
            if let Some(value) = action.gauge_value {
                line.push_str(&format!(" = {value}"));
            }
            if let (Some(min), Some(max)) = (action.gauge_min, action.gauge_max) {
                line.push_str(&format!(" in {min}..{max}"));
            }
        },
        ActionKind::Normal | ActionKind::Folder => {},
    }

    if action.is_disabled == Some(true) {
        line.push_str(" disabled");
    }
    line
}

/// Pretty JSON for a stored record.
pub fn record<T: Serialize>(record: &T) -> String {
    serde_json::to_string_pretty(record).unwrap_or_else(|e| format!("! unprintable record: {e}"))
}

/// Lowercase name of a session state.
pub fn state(state: SessionState) -> &'static str {
    match state {
        SessionState::Idle => "idle",
        SessionState::Connecting => "connecting",
        SessionState::Connected => "connected",
        SessionState::Reconnecting => "reconnecting",
    }
}

fn kind_name(kind: ActionKind) -> &'static str {
    match kind {
        ActionKind::Normal => "normal",
        ActionKind::Toggle => "toggle",
        ActionKind::Folder => "folder",
        ActionKind::Gauge => "gauge",
    }
}

#[cfg(test)]
mod tests {
    use deckbridge_client::ClientError;
    use deckbridge_core::SessionError;
    use deckbridge_proto::{Profile, Stored};

    use super::*;

    fn gauge() -> Action {
        let mut action = Action::new("cpu", ActionKind::Gauge, "CPU");
        action.gauge_value = Some(42.5);
        action.gauge_min = Some(0.0);
        action.gauge_max = Some(100.0);
        action
    }

    #[test]
    fn lifecycle_events() {
        insta::assert_snapshot!(event(&ClientEvent::Connected), @"* connected");
        insta::assert_snapshot!(event(&ClientEvent::Disconnected), @"* disconnected");
    }

    #[test]
    fn error_event() {
        let error = ClientError::Session(SessionError::ReconnectExhausted { attempts: 5 });
        insta::assert_snapshot!(
            event(&ClientEvent::Error(error)),
            @"! max reconnection attempts reached (5)"
        );
    }

    #[test]
    fn gauge_action() {
        let stored = Stored::first(gauge(), 1);
        insta::assert_snapshot!(
            event(&ClientEvent::Action(stored)),
            @"action cpu [gauge] CPU = 42.5 in 0..100"
        );
    }

    #[test]
    fn toggle_action() {
        let mut mute = Action::new("mute", ActionKind::Toggle, "Mute");
        mute.is_toggled = Some(true);
        mute.is_disabled = Some(true);
        insta::assert_snapshot!(action(&mute), @"mute [toggle] Mute (on) disabled");

        mute.is_toggled = None;
        mute.is_disabled = None;
        insta::assert_snapshot!(action(&mute), @"mute [toggle] Mute (off)");
    }

    #[test]
    fn profile_event() {
        let profile = Profile {
            id: "p1".into(),
            name: "Main".into(),
            rows: 2,
            columns: 4,
            actions: vec![gauge()],
            extra: serde_json::Map::new(),
        };
        insta::assert_snapshot!(
            event(&ClientEvent::Profile(profile)),
            @r#"profile p1 "Main" 2x4, 1 actions"#
        );
    }

    #[test]
    fn record_is_pretty_json() {
        let stored = Stored::first(Action::new("a1", ActionKind::Normal, "Go"), 7);
        let value: serde_json::Value = serde_json::from_str(&record(&stored)).unwrap();
        assert_eq!(value["id"], "a1");
        assert_eq!(value["createdAt"], 7);
        assert!(record(&stored).contains('\n'));
    }

    #[test]
    fn state_names() {
        assert_eq!(state(SessionState::Reconnecting), "reconnecting");
        assert_eq!(state(SessionState::Idle), "idle");
    }
}
