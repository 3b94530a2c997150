//! Deterministic simulation harness for Deckbridge testing.
//!
//! Implementations of the Environment, Transport and PlatformBridge seams for
//! reproducible tests under virtual time and simulated networks, plus a
//! scenario framework and a reference model for the session state machine.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod channel_transport;
pub mod memory_bridge;
pub mod model;
pub mod scenario;
pub mod sim_env;
pub mod sim_transport;

pub use channel_transport::{ChannelServer, ChannelTransport, ServerConn};
pub use memory_bridge::MemoryBridge;
pub use model::{ModelSession, ObservableState, Operation};
pub use sim_env::SimEnv;
pub use sim_transport::{LineConn, LineListener, SimTransport};
