//! Top-level failures of the command-line client.

use std::{io, path::PathBuf};

use deckbridge_client::ClientError;
use deckbridge_core::BridgeError;

/// Errors that end the process.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Config file missing or unreadable
    #[error("cannot read config {path}: {source}")]
    ConfigRead {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Config file is not JSON
    #[error("config {path} is not valid JSON: {reason}")]
    ConfigParse {
        /// File that failed
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// Neither a flag nor the config file supplied a server URL
    #[error("no server URL; pass --url or set serverUrl in the config file")]
    MissingUrl,

    /// Local database could not be opened
    #[error(transparent)]
    Storage(#[from] BridgeError),

    /// Client rejected its configuration
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Terminal I/O failed
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}
