//! Executes parsed commands against a running client.

use deckbridge_client::DeckClient;
use deckbridge_proto::Envelope;
use tracing::debug;

use crate::{
    Command,
    commands::HELP,
    render,
};

/// What the caller should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Show this text
    Print(String),
    /// Nothing to show
    Silent,
    /// Exit the input loop
    Quit,
}

/// Command executor bound to one client.
#[derive(Debug, Clone)]
pub struct Shell {
    client: DeckClient,
}

impl Shell {
    /// Wrap `client`.
    pub fn new(client: DeckClient) -> Self {
        Self { client }
    }

    /// Run `command`.
    ///
    /// Failures are reported as text; connection events arrive separately
    /// through the client's subscription.
    pub async fn execute(&self, command: Command) -> Outcome {
        debug!(?command, "executing");

        match command {
            Command::Connect => match self.client.connect().await {
                Ok(()) => Outcome::Silent,
                Err(e) => Outcome::Print(format!("! {e}")),
            },

            Command::Disconnect => {
                self.client.disconnect().await;
                Outcome::Silent
            },

            Command::Send { kind, data } => {
                match self.client.send_message(Envelope::new(kind.clone(), data)).await {
                    Ok(()) => Outcome::Print(format!("sent {kind}")),
                    Err(e) => Outcome::Print(format!("! {e}")),
                }
            },

            Command::Actions => {
                let ids = self.client.list_stored_actions().await;
                if ids.is_empty() {
                    Outcome::Print("no stored actions".into())
                } else {
                    Outcome::Print(ids.join("\n"))
                }
            },

            Command::ShowAction { id } => match self.client.get_stored_action(&id).await {
                Ok(Some(stored)) => Outcome::Print(render::record(&stored)),
                Ok(None) => Outcome::Print(format!("no stored action {id}")),
                Err(e) => Outcome::Print(format!("! {e}")),
            },

            Command::Config => match self.client.get_stored_config().await {
                Ok(Some(stored)) => Outcome::Print(render::record(&stored)),
                Ok(None) => Outcome::Print("no stored config".into()),
                Err(e) => Outcome::Print(format!("! {e}")),
            },

            Command::State => Outcome::Print(render::state(self.client.state()).into()),

            Command::Help => Outcome::Print(HELP.into()),

            Command::Quit => Outcome::Quit,

            Command::Empty => Outcome::Silent,

            Command::Unknown { input } => {
                Outcome::Print(format!("unknown command: {input} (try /help)"))
            },

            Command::InvalidArgs { command, error } => Outcome::Print(format!("/{command}: {error}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use deckbridge_harness::{ChannelServer, ChannelTransport, MemoryBridge, SimEnv};
    use deckbridge_proto::Config;
    use serde_json::json;

    use super::*;
    use crate::commands::parse;

    fn shell() -> (Shell, ChannelServer, Arc<MemoryBridge>) {
        let bridge = Arc::new(MemoryBridge::new());
        let (transport, server) = ChannelTransport::new();
        let client = DeckClient::builder(
            Config::new("ws://deck:9000", "deckctl", "0.1.0"),
            transport,
            SimEnv::new(),
        )
        .bridge(bridge.clone())
        .build()
        .unwrap();
        (Shell::new(client), server, bridge)
    }

    async fn run(shell: &Shell, line: &str) -> Outcome {
        shell.execute(parse(line)).await
    }

    #[tokio::test(start_paused = true)]
    async fn listings_on_empty_store() {
        let (shell, _server, _bridge) = shell();

        assert_eq!(run(&shell, "/actions").await, Outcome::Print("no stored actions".into()));
        assert_eq!(run(&shell, "/action a1").await, Outcome::Print("no stored action a1".into()));
        assert_eq!(run(&shell, "/config").await, Outcome::Print("no stored config".into()));
        assert_eq!(run(&shell, "/state").await, Outcome::Print("idle".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn send_before_connect_is_reported() {
        let (shell, _server, _bridge) = shell();
        let Outcome::Print(text) = run(&shell, "/send action {}").await else {
            panic!("expected output");
        };
        assert!(text.starts_with("! not connected"));
    }

    #[tokio::test(start_paused = true)]
    async fn connect_send_and_inspect() {
        let (shell, mut server, bridge) = shell();

        assert_eq!(run(&shell, "/connect").await, Outcome::Silent);
        assert_eq!(run(&shell, "/state").await, Outcome::Print("connected".into()));

        let mut conn = server.accept().await.unwrap();
        let _handshake = conn.recv().await.unwrap();

        assert_eq!(
            run(&shell, r#"/send action {"id":"a1"}"#).await,
            Outcome::Print("sent action".into())
        );
        let sent: serde_json::Value = serde_json::from_str(&conn.recv().await.unwrap()).unwrap();
        assert_eq!(sent, json!({"type": "action", "data": {"id": "a1"}}));

        bridge.insert("action:a1", r#"{"id":"a1","type":"normal","displayText":"Go","createdAt":1,"lastModified":2}"#);
        assert_eq!(run(&shell, "/actions").await, Outcome::Print("a1".into()));
        let Outcome::Print(record) = run(&shell, "/action a1").await else {
            panic!("expected record");
        };
        assert!(record.contains(r#""displayText": "Go""#));

        assert_eq!(run(&shell, "/disconnect").await, Outcome::Silent);
        assert_eq!(run(&shell, "/state").await, Outcome::Print("idle".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn meta_commands() {
        let (shell, _server, _bridge) = shell();

        assert_eq!(run(&shell, "").await, Outcome::Silent);
        assert_eq!(run(&shell, "/quit").await, Outcome::Quit);
        assert_eq!(run(&shell, "/help").await, Outcome::Print(HELP.into()));
        insta::assert_snapshot!(
            format!("{:?}", run(&shell, "/bogus").await),
            @r#"Print("unknown command: /bogus (try /help)")"#
        );
        insta::assert_snapshot!(
            format!("{:?}", run(&shell, "/action").await),
            @r#"Print("/action: Usage: /action <id>")"#
        );
    }
}
