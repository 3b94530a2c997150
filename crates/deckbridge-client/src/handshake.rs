//! Outbound identification message.

use deckbridge_core::PlatformBridge;
use deckbridge_proto::{Config, Handshake};
use tracing::warn;

/// Build the handshake for `config` from what the platform reports.
///
/// A failing bridge call does not block the handshake; the affected section
/// is sent with default values.
pub async fn build_handshake(bridge: &dyn PlatformBridge, config: &Config) -> Handshake {
    let device_info = bridge.device_info().await.unwrap_or_else(|e| {
        warn!(error = %e, "device info unavailable, sending defaults");
        Default::default()
    });

    let display_metrics = bridge.display_metrics().await.unwrap_or_else(|e| {
        warn!(error = %e, "display metrics unavailable, sending defaults");
        Default::default()
    });

    Handshake::new(config.client_name.clone(), config.version.clone(), device_info, display_metrics)
}
