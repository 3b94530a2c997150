//! Runtime task that owns the session.
//!
//! Interprets [`SessionAction`]s against the transport, the retry timer, the
//! state store and the event surface. Everything that touches the session
//! goes through [`Actor::apply`], one input at a time.

use std::{future::Future, pin::Pin, sync::Arc};

use deckbridge_core::{
    ConnectionId, Environment, MessageSink, MessageStream, Notice, PlatformBridge, Session,
    SessionAction, SessionConfig, SessionError, SessionInput, SessionState, Transport,
};
use deckbridge_proto::{Config, Envelope, Payload};
use deckbridge_store::StateStore;
use tokio::{
    sync::{broadcast, mpsc, oneshot, watch},
    task::JoinHandle,
};
use tracing::{debug, info, trace, warn};

use crate::{ClientError, ClientEvent, handshake::build_handshake};

/// Capacity of the child-task signal queue.
const SIGNAL_CAPACITY: usize = 64;

type Timer = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Requests from [`crate::DeckClient`] handles.
pub(crate) enum Command {
    /// Dial `config`, or the published config when `None`. A supplied
    /// config is published and persisted once a socket opens with it.
    Connect { config: Option<Config>, reply: oneshot::Sender<Result<(), ClientError>> },
    Disconnect { reply: oneshot::Sender<()> },
    Send { envelope: Envelope, reply: oneshot::Sender<Result<(), ClientError>> },
}

/// Reports from connect and reader tasks.
enum Signal<T: Transport> {
    Opened { conn: ConnectionId, sink: T::Sink, stream: T::Stream },
    Failed { conn: ConnectionId, reason: String },
    Text { conn: ConnectionId, text: String },
    Errored { conn: ConnectionId, reason: String },
    Closed { conn: ConnectionId },
}

/// The socket the session currently cares about.
struct Link<S> {
    conn: ConnectionId,
    /// Present once the socket has opened
    sink: Option<S>,
    /// Connect task while opening, reader task once open
    task: JoinHandle<()>,
}

/// Channel ends the actor serves.
pub(crate) struct Channels {
    pub commands: mpsc::Receiver<Command>,
    pub events: broadcast::Sender<ClientEvent>,
    pub state: watch::Sender<SessionState>,
    pub config: watch::Sender<Config>,
}

pub(crate) struct Actor<T: Transport, E: Environment> {
    session: Session,
    transport: Arc<T>,
    env: E,
    store: StateStore,
    bridge: Option<Arc<dyn PlatformBridge>>,
    channels: Channels,
    signals_tx: mpsc::Sender<Signal<T>>,
    signals: mpsc::Receiver<Signal<T>>,
    link: Option<Link<T::Sink>>,
    retry: Option<Timer>,
    pending_connect: Option<oneshot::Sender<Result<(), ClientError>>>,
    /// Config behind the current dial and its handshake
    dialed: Config,
    /// `dialed` still waits to be published
    unpublished: bool,
    /// Outcome of publishing `dialed`, owed to the connect waiter
    published: Option<Result<(), ClientError>>,
}

impl<T: Transport, E: Environment> Actor<T, E> {
    pub(crate) fn new(
        config: SessionConfig,
        transport: T,
        env: E,
        store: StateStore,
        bridge: Option<Arc<dyn PlatformBridge>>,
        channels: Channels,
    ) -> Self {
        let (signals_tx, signals) = mpsc::channel(SIGNAL_CAPACITY);
        let dialed = channels.config.borrow().clone();
        Self {
            session: Session::new(config),
            transport: Arc::new(transport),
            env,
            store,
            bridge,
            channels,
            signals_tx,
            signals,
            link: None,
            retry: None,
            pending_connect: None,
            dialed,
            unpublished: false,
            published: None,
        }
    }

    /// Serve until every handle is dropped.
    pub(crate) async fn run(mut self) {
        debug!("client runtime started");

        loop {
            tokio::select! {
                command = self.channels.commands.recv() => match command {
                    Some(command) => self.on_command(command).await,
                    None => break,
                },
                Some(signal) = self.signals.recv() => self.on_signal(signal).await,
                () = retry_elapsed(&mut self.retry) => {
                    self.retry = None;
                    self.apply(SessionInput::RetryElapsed).await;
                },
            }
        }

        self.apply(SessionInput::Disconnect).await;
        debug!("client runtime stopped");
    }

    async fn on_command(&mut self, command: Command) {
        match command {
            Command::Connect { config, reply } => {
                let unpublished = config.is_some();
                let config = config.unwrap_or_else(|| self.channels.config.borrow().clone());
                let url = config.server_url.clone();

                // Settles any previous waiter before this one is registered
                self.apply(SessionInput::Connect { url }).await;
                self.dialed = config;
                self.unpublished = unpublished;
                self.published = None;
                self.pending_connect = Some(reply);
            },
            Command::Disconnect { reply } => {
                self.apply(SessionInput::Disconnect).await;
                let _ = reply.send(());
            },
            Command::Send { envelope, reply } => {
                let result = match self.session.send(&envelope) {
                    Ok(actions) => self.write_all(actions).await,
                    Err(e) => Err(e.into()),
                };
                let _ = reply.send(result);
            },
        }
    }

    async fn on_signal(&mut self, signal: Signal<T>) {
        match signal {
            Signal::Opened { conn, mut sink, stream } => {
                let reader = self.spawn_reader(conn, stream);
                match self.link.as_mut() {
                    Some(link) if link.conn == conn => {
                        link.sink = Some(sink);
                        link.task = reader;
                    },
                    _ => {
                        debug!(conn, "closing socket that opened after teardown");
                        reader.abort();
                        if let Err(e) = sink.close().await {
                            trace!(conn, error = %e, "close of stale socket failed");
                        }
                        return;
                    },
                }
                self.apply(SessionInput::TransportOpened { conn }).await;
            },
            Signal::Failed { conn, reason } => {
                self.apply(SessionInput::TransportError { conn, reason }).await;
                self.drop_link(conn);
                self.apply(SessionInput::TransportClosed { conn }).await;
            },
            Signal::Text { conn, text } => {
                self.apply(SessionInput::TextReceived { conn, text }).await;
            },
            Signal::Errored { conn, reason } => {
                self.apply(SessionInput::TransportError { conn, reason }).await;
            },
            Signal::Closed { conn } => {
                self.drop_link(conn);
                self.apply(SessionInput::TransportClosed { conn }).await;
            },
        }
    }

    async fn apply(&mut self, input: SessionInput) {
        let actions = self.session.handle(input);
        self.execute(actions).await;
    }

    async fn execute(&mut self, actions: Vec<SessionAction>) {
        for action in actions {
            match action {
                SessionAction::Open { conn, url } => self.open(conn, url),
                SessionAction::Close { conn } => self.close(conn).await,
                SessionAction::SendHandshake { conn } => self.send_handshake(conn).await,
                SessionAction::SendText { conn, text } => {
                    if let Err(e) = self.write(conn, text).await {
                        warn!(conn, error = %e, "send failed");
                    }
                },
                SessionAction::ScheduleRetry { delay, attempt } => {
                    debug!(?delay, attempt, "retry timer armed");
                    let env = self.env.clone();
                    let timer: Timer = Box::pin(async move { env.sleep(delay).await });
                    self.retry = Some(timer);
                },
                SessionAction::CancelRetry => self.retry = None,
                SessionAction::SettleConnect(result) => {
                    let published = self.published.take().unwrap_or(Ok(()));
                    if let Some(reply) = self.pending_connect.take() {
                        let _ = reply.send(result.map_err(ClientError::from).and(published));
                    }
                },
                SessionAction::Notify(Notice::Connected) => {
                    if self.unpublished {
                        let result = self.publish_dialed().await;
                        if self.pending_connect.is_some() {
                            self.published = Some(result);
                        } else if let Err(e) = result {
                            self.publish(ClientEvent::Error(e));
                        }
                    }
                    self.publish(ClientEvent::Connected);
                },
                SessionAction::Notify(notice) => self.publish(match notice {
                    Notice::Connected => ClientEvent::Connected,
                    Notice::Disconnected => ClientEvent::Disconnected,
                    Notice::Error(e) => ClientEvent::Error(e.into()),
                }),
                SessionAction::Dispatch(payload) => self.dispatch(payload).await,
            }
        }

        self.channels.state.send_replace(self.session.state());
    }

    fn open(&mut self, conn: ConnectionId, url: String) {
        let transport = Arc::clone(&self.transport);
        let signals = self.signals_tx.clone();

        let task = tokio::spawn(async move {
            let signal = match transport.connect(&url).await {
                Ok((sink, stream)) => Signal::Opened { conn, sink, stream },
                Err(e) => Signal::Failed { conn, reason: e.to_string() },
            };
            let _ = signals.send(signal).await;
        });

        if let Some(previous) = self.link.replace(Link { conn, sink: None, task }) {
            previous.task.abort();
        }
    }

    fn spawn_reader(&self, conn: ConnectionId, mut stream: T::Stream) -> JoinHandle<()> {
        let signals = self.signals_tx.clone();

        tokio::spawn(async move {
            loop {
                let signal = match stream.recv().await {
                    Ok(Some(text)) => Signal::Text { conn, text },
                    Ok(None) => break,
                    Err(e) => {
                        let _ = signals.send(Signal::Errored { conn, reason: e.to_string() }).await;
                        break;
                    },
                };
                if signals.send(signal).await.is_err() {
                    return;
                }
            }
            let _ = signals.send(Signal::Closed { conn }).await;
        })
    }

    async fn close(&mut self, conn: ConnectionId) {
        let Some(mut link) = self.link.take_if(|link| link.conn == conn) else {
            return;
        };

        link.task.abort();
        if let Some(sink) = link.sink.as_mut() {
            if let Err(e) = sink.close().await {
                debug!(conn, error = %e, "socket close failed");
            }
        }
    }

    fn drop_link(&mut self, conn: ConnectionId) {
        if self.link.as_ref().is_some_and(|link| link.conn == conn) {
            self.link = None;
        }
    }

    async fn send_handshake(&mut self, conn: ConnectionId) {
        let Some(bridge) = self.bridge.clone() else {
            debug!(conn, "no platform bridge, skipping handshake");
            return;
        };

        let handshake = build_handshake(bridge.as_ref(), &self.dialed).await;

        let text = match Payload::Handshake(handshake).into_envelope().and_then(|e| e.encode()) {
            Ok(text) => text,
            Err(e) => {
                warn!(conn, error = %e, "failed to encode handshake");
                return;
            },
        };

        match self.write(conn, text).await {
            Ok(()) => debug!(conn, "handshake sent"),
            Err(e) => warn!(conn, error = %e, "failed to send handshake"),
        }
    }

    /// Adopt the config a socket just opened with, then persist it.
    async fn publish_dialed(&mut self) -> Result<(), ClientError> {
        self.unpublished = false;
        self.channels.config.send_replace(self.dialed.clone());

        if let Err(e) = self.store.store_config(&self.dialed, self.env.unix_millis()).await {
            warn!(error = %e, "failed to persist config");
            return Err(e.into());
        }

        info!(server_url = %self.dialed.server_url, "client initialized");
        Ok(())
    }

    async fn write_all(&mut self, actions: Vec<SessionAction>) -> Result<(), ClientError> {
        for action in actions {
            if let SessionAction::SendText { conn, text } = action {
                self.write(conn, text).await?;
            }
        }
        Ok(())
    }

    async fn write(&mut self, conn: ConnectionId, text: String) -> Result<(), ClientError> {
        let state = self.session.state();
        let Some(sink) =
            self.link.as_mut().filter(|link| link.conn == conn).and_then(|link| link.sink.as_mut())
        else {
            return Err(SessionError::NotConnected { state }.into());
        };

        sink.send(text)
            .await
            .map_err(|e| SessionError::ConnectionFailed { reason: e.to_string() }.into())
    }

    async fn dispatch(&mut self, payload: Payload) {
        let now = self.env.unix_millis();

        let event = match payload {
            Payload::Action(action) => match self.store.store_action(&action, now).await {
                Ok(stored) => {
                    info!(id = %stored.record.id, "action received");
                    ClientEvent::Action(stored)
                },
                Err(e) => {
                    warn!(id = %action.id, error = %e, "dropping action that could not be stored");
                    ClientEvent::Error(e.into())
                },
            },
            Payload::Config(config) => match self.store.store_config(&config, now).await {
                Ok(stored) => {
                    info!("config received");
                    ClientEvent::Config(stored)
                },
                Err(e) => {
                    warn!(error = %e, "dropping config that could not be stored");
                    ClientEvent::Error(e.into())
                },
            },
            Payload::Profile(profile) => {
                info!(id = %profile.id, "profile received");
                ClientEvent::Profile(profile)
            },
            Payload::Handshake(_) => {
                debug!("ignoring inbound handshake");
                return;
            },
        };

        self.publish(event);
    }

    fn publish(&self, event: ClientEvent) {
        if self.channels.events.send(event).is_err() {
            trace!("event published with no subscribers");
        }
    }
}

async fn retry_elapsed(retry: &mut Option<Timer>) {
    match retry {
        Some(timer) => timer.as_mut().await,
        None => std::future::pending().await,
    }
}
