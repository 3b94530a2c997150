//! Command-line options and client config assembly.

use std::path::{Path, PathBuf};

use clap::Parser;
use deckbridge_client::config_from_value;
use deckbridge_proto::Config;
use serde_json::{Map, Value};

use crate::CliError;

/// Interactive client for a Deckbridge server.
#[derive(Debug, Parser)]
#[command(name = "deckctl", version, about)]
pub struct Options {
    /// Server URL, e.g. ws://localhost:9000
    #[arg(short, long)]
    pub url: Option<String>,

    /// JSON config file; flags override its fields
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Client name sent in the handshake
    #[arg(long)]
    pub name: Option<String>,

    /// Local database file
    #[arg(long, default_value = "deckbridge.redb")]
    pub data: PathBuf,

    /// Reported screen width in pixels
    #[arg(long, default_value_t = 1920)]
    pub width: u32,

    /// Reported screen height in pixels
    #[arg(long, default_value_t = 1080)]
    pub height: u32,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    pub log: String,
}

impl Options {
    /// Client config from the config file and flags.
    pub fn client_config(&self) -> Result<Config, CliError> {
        let mut fields = match &self.config {
            Some(path) => read_config(path)?,
            None => Map::new(),
        };

        if let Some(url) = &self.url {
            fields.insert("serverUrl".into(), Value::String(url.clone()));
        }
        if let Some(name) = &self.name {
            fields.insert("clientName".into(), Value::String(name.clone()));
        }
        fields.entry("clientName").or_insert_with(|| Value::String("deckctl".into()));
        fields
            .entry("version")
            .or_insert_with(|| Value::String(env!("CARGO_PKG_VERSION").into()));

        if !fields.contains_key("serverUrl") {
            return Err(CliError::MissingUrl);
        }
        Ok(config_from_value(Value::Object(fields))?)
    }
}

fn read_config(path: &Path) -> Result<Map<String, Value>, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| CliError::ConfigRead { path: path.to_path_buf(), source })?;

    match serde_json::from_str(&text) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(CliError::ConfigParse { path: path.to_path_buf(), reason: "expected an object".into() }),
        Err(e) => Err(CliError::ConfigParse { path: path.to_path_buf(), reason: e.to_string() }),
    }
}
