//! Command parsing for the interactive shell.
//!
//! This module parses input lines into structured [`Command`] values.

use serde_json::{Map, Value};

/// Parsed command from user input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Connect (or reconnect) to the configured server.
    Connect,

    /// Close the connection and stop retrying.
    Disconnect,

    /// Send an envelope to the server.
    Send {
        /// Envelope `type`
        kind: String,
        /// Envelope `data`
        data: Value,
    },

    /// List stored action ids.
    Actions,

    /// Show one stored action.
    ShowAction {
        /// Action id
        id: String,
    },

    /// Show the stored config.
    Config,

    /// Show the connection state.
    State,

    /// List available commands.
    Help,

    /// Quit the application.
    Quit,

    /// Blank line.
    Empty,

    /// Unknown or invalid command.
    Unknown {
        /// The original input.
        input: String,
    },

    /// Command with missing or invalid arguments.
    InvalidArgs {
        /// Command name.
        command: String,
        /// Error message.
        error: String,
    },
}

/// One line per command, shown by `/help`.
pub const HELP: &str = "\
/connect                 connect to the server
/disconnect              close the connection
/send <type> [json]      send an envelope
/actions                 list stored actions
/action <id>             show a stored action
/config                  show the stored config
/state                   show the connection state
/quit                    exit";

/// Parse a user input string into a command.
///
/// Commands start with `/`. Anything else is unknown.
pub fn parse(input: &str) -> Command {
    let input = input.trim();

    if input.is_empty() {
        return Command::Empty;
    }

    let Some(cmd_str) = input.strip_prefix('/') else {
        return Command::Unknown { input: input.to_string() };
    };

    let (command, rest) = split_word(cmd_str);

    match command {
        "connect" => Command::Connect,

        "disconnect" => Command::Disconnect,

        "send" => parse_send(rest),

        "actions" => Command::Actions,

        "action" => match split_word(rest) {
            ("", _) => Command::InvalidArgs {
                command: "action".into(),
                error: "Usage: /action <id>".into(),
            },
            (id, _) => Command::ShowAction { id: id.to_string() },
        },

        "config" => Command::Config,

        "state" => Command::State,

        "help" | "h" | "?" => Command::Help,

        "quit" | "q" => Command::Quit,

        _ => Command::Unknown { input: input.to_string() },
    }
}

fn parse_send(args: &str) -> Command {
    let (kind, body) = split_word(args);
    if kind.is_empty() {
        return Command::InvalidArgs {
            command: "send".into(),
            error: "Usage: /send <type> [json]".into(),
        };
    }

    if body.is_empty() {
        return Command::Send { kind: kind.to_string(), data: Value::Object(Map::new()) };
    }

    match serde_json::from_str(body) {
        Ok(data) => Command::Send { kind: kind.to_string(), data },
        Err(e) => Command::InvalidArgs { command: "send".into(), error: format!("Invalid JSON: {e}") },
    }
}

/// First whitespace-separated word and the trimmed remainder.
fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    s.split_once(char::is_whitespace).map_or((s, ""), |(word, rest)| (word, rest.trim()))
}
