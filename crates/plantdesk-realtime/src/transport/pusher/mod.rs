//! Pusher Channels client over WebSocket.

pub mod protocol;

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, trace, warn};
use url::Url;

use plantdesk_core::config::RealtimeConfig;
use plantdesk_core::result::AppResult;

use crate::state::ConnectionState;

use self::protocol::{ErrorAction, Inbound};
use super::{PushTransport, TransportEvent};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long `disconnect` waits for the socket task to close cleanly.
const CLOSE_GRACE: Duration = Duration::from_secs(2);

/// Commands from the transport handle to the socket task.
#[derive(Debug)]
enum Command {
    Subscribe(String),
    Unsubscribe(String),
    Close,
}

/// Pusher-protocol push transport.
///
/// A single socket task owns the WebSocket. The handle keeps the desired
/// subscription set so that subscriptions made before the handshake
/// completes are sent as soon as the broker confirms the connection.
#[derive(Debug)]
pub struct PusherTransport {
    config: RealtimeConfig,
    subscriptions: Arc<Mutex<BTreeSet<String>>>,
    commands: Mutex<Option<mpsc::UnboundedSender<Command>>>,
    task: Mutex<Option<JoinHandle<()>>>,
    state_tx: Arc<watch::Sender<ConnectionState>>,
}

impl PusherTransport {
    /// Create a transport for the configured app key and cluster.
    pub fn new(config: RealtimeConfig) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Initialized);
        Self {
            config,
            subscriptions: Arc::new(Mutex::new(BTreeSet::new())),
            commands: Mutex::new(None),
            task: Mutex::new(None),
            state_tx: Arc::new(state_tx),
        }
    }

    fn send_command(&self, command: Command) {
        let commands = self.commands.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(tx) = commands.as_ref() {
            let _ = tx.send(command);
        }
    }

    async fn stop_task(&self) {
        self.send_command(Command::Close);
        self.commands
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();

        let task = self.task.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(mut handle) = task {
            if time::timeout(CLOSE_GRACE, &mut handle).await.is_err() {
                debug!("Pusher socket task did not close in time, aborting");
                handle.abort();
            }
        }
    }
}

#[async_trait]
impl PushTransport for PusherTransport {
    async fn connect(&self) -> AppResult<mpsc::Receiver<TransportEvent>> {
        self.stop_task().await;

        let url = match protocol::build_url(&self.config) {
            Ok(url) => url,
            Err(e) => {
                self.state_tx.send_replace(ConnectionState::Failed);
                return Err(e);
            }
        };

        let (event_tx, event_rx) = mpsc::channel(self.config.channel_buffer_size.max(1));
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();

        self.state_tx.send_replace(ConnectionState::Connecting);

        let socket = SocketTask {
            url,
            activity_timeout: Duration::from_secs(self.config.activity_timeout_seconds.max(1)),
            pong_timeout: Duration::from_secs(self.config.pong_timeout_seconds.max(1)),
            subscriptions: self.subscriptions.clone(),
            state_tx: self.state_tx.clone(),
            events: event_tx,
        };
        let handle = tokio::spawn(socket.run(cmd_rx));

        *self.commands.lock().unwrap_or_else(|e| e.into_inner()) = Some(cmd_tx);
        *self.task.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);

        Ok(event_rx)
    }

    async fn subscribe(&self, channel: &str) -> AppResult<()> {
        let inserted = self
            .subscriptions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(channel.to_string());
        if inserted {
            self.send_command(Command::Subscribe(channel.to_string()));
        }
        Ok(())
    }

    async fn unsubscribe(&self, channel: &str) -> AppResult<()> {
        let removed = self
            .subscriptions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(channel);
        if removed {
            self.send_command(Command::Unsubscribe(channel.to_string()));
        }
        Ok(())
    }

    async fn disconnect(&self) {
        self.stop_task().await;
        self.subscriptions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        self.state_tx.send_replace(ConnectionState::Disconnected);
    }

    fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }
}

/// Everything the socket task owns.
struct SocketTask {
    url: Url,
    activity_timeout: Duration,
    pong_timeout: Duration,
    subscriptions: Arc<Mutex<BTreeSet<String>>>,
    state_tx: Arc<watch::Sender<ConnectionState>>,
    events: mpsc::Sender<TransportEvent>,
}

impl SocketTask {
    async fn run(self, mut commands: mpsc::UnboundedReceiver<Command>) {
        info!(host = ?self.url.host_str(), "Connecting to push broker");

        let mut stream = match connect_async(self.url.as_str()).await {
            Ok((stream, _)) => stream,
            Err(e) => {
                warn!(error = %e, "Push broker connection failed");
                self.state_tx.send_replace(ConnectionState::Unavailable);
                return;
            }
        };

        let final_state = self.drive(&mut stream, &mut commands).await;
        if final_state == ConnectionState::Disconnected {
            let _ = stream.close(None).await;
        }
        self.state_tx.send_replace(final_state);
        debug!(state = %final_state, "Push socket task stopped");
    }

    /// Runs the read/command/keepalive loop and returns the state to settle in.
    async fn drive(
        &self,
        stream: &mut WsStream,
        commands: &mut mpsc::UnboundedReceiver<Command>,
    ) -> ConnectionState {
        let started = Instant::now();
        let mut established = false;
        let mut activity_timeout = self.activity_timeout;
        let mut last_activity = Instant::now();
        let mut awaiting_pong: Option<Instant> = None;

        let mut keepalive = time::interval(Duration::from_secs(1));
        keepalive.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                msg = stream.next() => {
                    last_activity = Instant::now();
                    awaiting_pong = None;

                    let text = match msg {
                        Some(Ok(Message::Text(text))) => text,
                        Some(Ok(Message::Close(frame))) => {
                            info!(?frame, "Push broker closed the connection");
                            return ConnectionState::Unavailable;
                        }
                        Some(Ok(_)) => continue,
                        Some(Err(e)) => {
                            warn!(error = %e, "Push socket error");
                            return ConnectionState::Unavailable;
                        }
                        None => {
                            warn!("Push socket stream ended");
                            return ConnectionState::Unavailable;
                        }
                    };

                    let inbound = match protocol::decode(text.as_str()) {
                        Ok(inbound) => inbound,
                        Err(e) => {
                            warn!(error = %e, "Undecodable push frame");
                            continue;
                        }
                    };

                    match inbound {
                        Inbound::ConnectionEstablished { socket_id, activity_timeout: suggested } => {
                            if let Some(secs) = suggested.filter(|s| *s > 0) {
                                activity_timeout = activity_timeout.min(Duration::from_secs(secs));
                            }
                            info!(socket_id = %socket_id, "Push connection established");
                            established = true;
                            self.state_tx.send_replace(ConnectionState::Connected);

                            let channels: Vec<String> = self
                                .subscriptions
                                .lock()
                                .unwrap_or_else(|e| e.into_inner())
                                .iter()
                                .cloned()
                                .collect();
                            for channel in channels {
                                if !send_text(stream, protocol::subscribe_frame(&channel)).await {
                                    return ConnectionState::Unavailable;
                                }
                            }
                        }
                        Inbound::SubscriptionSucceeded { channel } => {
                            debug!(channel = %channel, "Subscribed to push channel");
                        }
                        Inbound::Ping => {
                            if !send_text(stream, protocol::pong_frame()).await {
                                return ConnectionState::Unavailable;
                            }
                        }
                        Inbound::Pong => trace!("Push pong received"),
                        Inbound::Error { code, message } => {
                            warn!(?code, message = %message, "Push broker error");
                            match ErrorAction::for_code(code) {
                                ErrorAction::Fatal => return ConnectionState::Failed,
                                ErrorAction::Reconnect => return ConnectionState::Unavailable,
                                ErrorAction::Ignore => {}
                            }
                        }
                        Inbound::Event(event) => {
                            if self.events.send(event).await.is_err() {
                                debug!("Push event receiver dropped, closing socket");
                                return ConnectionState::Disconnected;
                            }
                        }
                        Inbound::Other(name) => trace!(event = %name, "Ignoring push frame"),
                    }
                }
                command = commands.recv() => {
                    let frame = match command {
                        Some(Command::Subscribe(channel)) => protocol::subscribe_frame(&channel),
                        Some(Command::Unsubscribe(channel)) => protocol::unsubscribe_frame(&channel),
                        Some(Command::Close) | None => return ConnectionState::Disconnected,
                    };
                    // Before the handshake, subscriptions are flushed on connection_established.
                    if established && !send_text(stream, frame).await {
                        return ConnectionState::Unavailable;
                    }
                }
                _ = keepalive.tick() => {
                    if !established {
                        if started.elapsed() > self.pong_timeout {
                            warn!("Push handshake timed out");
                            return ConnectionState::Unavailable;
                        }
                        continue;
                    }
                    match awaiting_pong {
                        Some(sent) if sent.elapsed() > self.pong_timeout => {
                            warn!("Push broker did not answer ping");
                            return ConnectionState::Unavailable;
                        }
                        Some(_) => {}
                        None if last_activity.elapsed() >= activity_timeout => {
                            if !send_text(stream, protocol::ping_frame()).await {
                                return ConnectionState::Unavailable;
                            }
                            awaiting_pong = Some(Instant::now());
                        }
                        None => {}
                    }
                }
            }
        }
    }
}

async fn send_text(stream: &mut WsStream, frame: String) -> bool {
    match stream.send(Message::text(frame)).await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Failed to write push frame");
            false
        }
    }
}
