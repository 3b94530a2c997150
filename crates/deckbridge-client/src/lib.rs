//! Deckbridge client runtime
//!
//! Runs the [`deckbridge_core::Session`] state machine against real sockets,
//! timers and storage, and publishes what happens to any number of
//! subscribers.
//!
//! # Architecture
//!
//! One tokio task owns the session, the socket write half and the retry
//! timer. [`DeckClient`] is a cheap cloneable handle that talks to it over a
//! channel. Connect attempts and socket readers run as child tasks and report
//! back tagged with their connection id, so the owner processes one input at
//! a time and never races itself.
//!
//! # Components
//!
//! - [`client`]: Public handle and builder
//! - [`event`]: Event surface (broadcast subscriptions)
//! - [`handshake`]: Outbound identification message
//! - [`mod@env`]: Production environment (system clock, tokio timer)
//! - [`error`]: Client error types
//! - `ws`: WebSocket transport (feature `transport`)

mod actor;
pub mod client;
pub mod env;
pub mod error;
pub mod event;
pub mod handshake;
#[cfg(feature = "transport")]
pub mod ws;

pub use client::{DeckClient, DeckClientBuilder, config_from_value};
pub use env::SystemEnv;
pub use error::ClientError;
pub use event::{ClientEvent, EventKind, Subscription, SubscriptionError};
#[cfg(feature = "transport")]
pub use ws::WsTransport;
