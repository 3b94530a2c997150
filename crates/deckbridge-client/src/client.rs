//! Public client handle.

use std::sync::Arc;

use deckbridge_core::{Environment, PlatformBridge, SessionConfig, SessionState, Transport};
use deckbridge_proto::{Action, Config, Envelope, Record, Stored};
use deckbridge_store::{PersistenceAdapter, StateStore, Storage, select_adapter};
use serde_json::Value;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::debug;

use crate::{
    ClientError, EventKind, Subscription,
    actor::{Actor, Channels, Command},
};

/// Default number of events buffered per subscriber.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Capacity of the handle-to-runtime command queue.
const COMMAND_CAPACITY: usize = 32;

/// Parse a config from untyped JSON.
///
/// # Errors
///
/// `InvalidConfig` if the value does not satisfy the config contract.
pub fn config_from_value(value: Value) -> Result<Config, ClientError> {
    Config::from_data(value).map_err(|e| ClientError::InvalidConfig(e.to_string()))
}

/// Builder for [`DeckClient`].
pub struct DeckClientBuilder<T: Transport, E: Environment> {
    config: Config,
    transport: T,
    env: E,
    bridge: Option<Arc<dyn PlatformBridge>>,
    adapter: Option<Arc<dyn PersistenceAdapter>>,
    session: SessionConfig,
    event_capacity: usize,
}

impl<T: Transport, E: Environment> DeckClientBuilder<T, E> {
    /// Platform bridge for the handshake and native storage.
    #[must_use]
    pub fn bridge(mut self, bridge: Arc<dyn PlatformBridge>) -> Self {
        self.bridge = Some(bridge);
        self
    }

    /// Backend used when the config selects `custom` storage.
    #[must_use]
    pub fn adapter(mut self, adapter: Arc<dyn PersistenceAdapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    /// Reconnect policy.
    #[must_use]
    pub fn session_config(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    /// Events buffered per subscriber before the oldest are dropped.
    #[must_use]
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    /// Validate the config, pick the storage backend and start the runtime.
    ///
    /// Must be called from within a tokio runtime. Nothing is spawned when
    /// validation fails.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the config is malformed or its storage backend was
    /// not supplied.
    pub fn build(self) -> Result<DeckClient, ClientError> {
        self.config.validate().map_err(|e| ClientError::InvalidConfig(e.to_string()))?;

        let adapter = select_adapter(self.config.storage_kind(), self.bridge.clone(), self.adapter)
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;
        let store = StateStore::new(Storage::new(adapter));

        let (commands_tx, commands) = mpsc::channel(COMMAND_CAPACITY);
        let (events, _) = broadcast::channel(self.event_capacity);
        let (state_tx, state) = watch::channel(SessionState::Idle);
        let (config_tx, config) = watch::channel(self.config);

        let channels =
            Channels { commands, events: events.clone(), state: state_tx, config: config_tx };
        let actor =
            Actor::new(self.session, self.transport, self.env, store.clone(), self.bridge, channels);
        tokio::spawn(actor.run());

        debug!("client built");
        Ok(DeckClient { commands: commands_tx, events, state, config, store })
    }
}

/// Handle to a running client.
///
/// Cloning is cheap; every clone drives the same session. The runtime stops
/// once the last handle is dropped.
#[derive(Clone)]
pub struct DeckClient {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<crate::ClientEvent>,
    state: watch::Receiver<SessionState>,
    config: watch::Receiver<Config>,
    store: StateStore,
}

impl std::fmt::Debug for DeckClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeckClient").field("state", &self.state()).finish_non_exhaustive()
    }
}

impl DeckClient {
    /// Start building a client.
    pub fn builder<T: Transport, E: Environment>(
        config: Config,
        transport: T,
        env: E,
    ) -> DeckClientBuilder<T, E> {
        DeckClientBuilder {
            config,
            transport,
            env,
            bridge: None,
            adapter: None,
            session: SessionConfig::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    /// Merge the stored config over the current one, connect with it, then
    /// persist it.
    ///
    /// Stored keys win the merge. The merged config becomes
    /// [`DeckClient::config`] only once a socket opens with it; any failure
    /// before that leaves the effective config untouched.
    pub async fn initialize(&self) -> Result<(), ClientError> {
        let mut config = self.config();

        if let Some(stored) = self.store.get_config().await? {
            config = config
                .merged_with(&stored.record)
                .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;
            debug!(server_url = %config.server_url, "merged stored config");
        }

        self.request(|reply| Command::Connect { config: Some(config), reply }).await?
    }

    /// Connect to the configured server, replacing any existing socket.
    ///
    /// Resolves once the socket opens, or with `ConnectionFailed` if the
    /// first attempt fails. Either way, later losses are retried in the
    /// background with a fresh attempt budget.
    pub async fn connect(&self) -> Result<(), ClientError> {
        self.request(|reply| Command::Connect { config: None, reply }).await?
    }

    /// Close the socket and stop retrying. Safe to call in any state.
    pub async fn disconnect(&self) {
        if self.request(|reply| Command::Disconnect { reply }).await.is_err() {
            debug!("disconnect after runtime shutdown");
        }
    }

    /// Send an envelope on the open socket.
    ///
    /// # Errors
    ///
    /// `NotConnected` unless connected; nothing is written or queued.
    pub async fn send_message(&self, envelope: Envelope) -> Result<(), ClientError> {
        self.request(|reply| Command::Send { envelope, reply }).await?
    }

    /// Stored action by id.
    pub async fn get_stored_action(&self, id: &str) -> Result<Option<Stored<Action>>, ClientError> {
        Ok(self.store.get_action(id).await?)
    }

    /// Stored config.
    pub async fn get_stored_config(&self) -> Result<Option<Stored<Config>>, ClientError> {
        Ok(self.store.get_config().await?)
    }

    /// Ids of stored actions. Empty when the backend cannot enumerate.
    pub async fn list_stored_actions(&self) -> Vec<String> {
        self.store.list_stored_actions().await
    }

    /// Subscribe to every event.
    pub fn subscribe(&self) -> Subscription {
        Subscription::new(self.events.subscribe(), None)
    }

    /// Subscribe to events of the given kinds only.
    pub fn subscribe_to(&self, kinds: &[EventKind]) -> Subscription {
        Subscription::new(self.events.subscribe(), Some(kinds.to_vec()))
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Receiver that observes every session state change.
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// Effective config.
    pub fn config(&self) -> Config {
        self.config.borrow().clone()
    }

    async fn request<R>(
        &self,
        command: impl FnOnce(oneshot::Sender<R>) -> Command,
    ) -> Result<R, ClientError> {
        let (reply, rx) = oneshot::channel();
        self.commands.send(command(reply)).await.map_err(|_| ClientError::Shutdown)?;
        rx.await.map_err(|_| ClientError::Shutdown)
    }
}
