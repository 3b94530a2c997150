//! Line-oriented desktop client for Deckbridge.
//!
//! Reads slash commands from stdin, drives a [`deckbridge_client::DeckClient`]
//! and prints events as they arrive. Records persist in a local redb file.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod commands;
pub mod desktop;
pub mod error;
pub mod options;
pub mod render;
pub mod shell;

pub use commands::Command;
pub use desktop::DesktopBridge;
pub use error::CliError;
pub use options::Options;
pub use shell::{Outcome, Shell};
