//! WebSocket client implementation.
//!
//! This module contains the core WebSocket client for connecting to the
//! quote transport with automatic reconnection.

use crate::config::ListenerConfig;
use crate::error::EngineError;
use crate::ws::models::events::{parse_ws_message, WsEvent};
use crate::ws::protocol::{Subscription, WsAuthMessage, WsSubscribeMessage};
use futures::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Duration, Instant};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, instrument, warn};

/// WebSocket client for the quote transport.
///
/// Manages the connection lifecycle: authentication, subscription
/// management with resubscribe on reconnect, and ping/pong keepalive.
///
/// # Example
///
/// ```no_run
/// use massive_optprob::config::ListenerConfig;
/// use massive_optprob::ws::WsClient;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = WsClient::new(ListenerConfig::new("api-key"))?;
///     let (handle, stream) = client.connect().await?;
///     // Use handle and stream...
///     Ok(())
/// }
/// ```
pub struct WsClient {
    config: ListenerConfig,
}

/// Handle for managing an active WebSocket connection.
///
/// `Clone` and `Send`, so it can be shared across tasks.
#[derive(Clone)]
pub struct WsHandle {
    cmd_tx: mpsc::Sender<WsCommand>,
    state: Arc<WsState>,
    state_rx: watch::Receiver<ConnectionState>,
}

/// Shared state for a WebSocket connection.
pub struct WsState {
    /// Whether authentication has succeeded.
    pub authenticated: AtomicBool,
    /// Current subscriptions.
    pub subscriptions: Mutex<Vec<Subscription>>,
    /// Timestamp of last message received (Unix millis).
    pub last_message_time: AtomicU64,
    /// Number of messages received.
    pub message_count: AtomicU64,
    /// Number of reconnection attempts.
    pub reconnect_count: AtomicU32,
    shutdown: AtomicBool,
}

/// Connection state for monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Connecting to server.
    Connecting,
    /// Connected and authenticating.
    Authenticating,
    /// Authenticated and ready.
    Connected,
    /// Reconnecting after disconnection.
    Reconnecting(u32),
    /// Disconnected (terminal state).
    Disconnected,
}

/// Stream of WebSocket events.
pub type WsEventStream =
    std::pin::Pin<Box<dyn futures::Stream<Item = Result<WsMessageBatch, EngineError>> + Send>>;

/// Batch of WebSocket messages (may contain 1 or more events).
#[derive(Debug, Clone)]
pub struct WsMessageBatch {
    /// Events in this batch.
    pub events: Vec<WsEvent>,
    /// When this batch was received (monotonic time).
    pub received_at: Instant,
}

/// Commands sent to the WebSocket IO task.
enum WsCommand {
    Subscribe(Vec<Subscription>, oneshot::Sender<Result<(), EngineError>>),
    Unsubscribe(Vec<Subscription>, oneshot::Sender<Result<(), EngineError>>),
    Close(oneshot::Sender<()>),
}

/// Snapshot of connection statistics.
#[derive(Debug, Clone)]
pub struct WsStats {
    /// Total messages received.
    pub message_count: u64,
    /// Time since last message.
    pub last_message_age: Duration,
    /// Number of reconnection attempts.
    pub reconnect_count: u32,
    /// Current subscription count.
    pub subscription_count: usize,
}

const EVENT_CHANNEL_CAPACITY: usize = 1024;

impl WsClient {
    /// Create a new WebSocket client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty.
    pub fn new(config: ListenerConfig) -> Result<Self, EngineError> {
        if config.api_key.is_empty() {
            return Err(EngineError::Configuration {
                message: "listener API key is empty".into(),
            });
        }
        Ok(Self { config })
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &ListenerConfig {
        &self.config
    }

    /// Connect to the WebSocket server.
    ///
    /// Returns a handle for managing the connection and a stream of events.
    /// Reconnection happens transparently while the stream is polled.
    #[instrument(skip(self))]
    pub async fn connect(&self) -> Result<(WsHandle, WsEventStream), EngineError> {
        info!(url = %self.config.url, "connecting to quote transport");

        let (cmd_tx, cmd_rx) = mpsc::channel::<WsCommand>(32);
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let state = Arc::new(WsState {
            authenticated: AtomicBool::new(false),
            subscriptions: Mutex::new(Vec::new()),
            last_message_time: AtomicU64::new(0),
            message_count: AtomicU64::new(0),
            reconnect_count: AtomicU32::new(0),
            shutdown: AtomicBool::new(false),
        });

        let (ws_stream, _response) = connect_async(self.config.url.as_str())
            .await
            .map_err(|e| EngineError::Listener(e.to_string()))?;

        let _ = state_tx.send(ConnectionState::Authenticating);

        let io_state = state.clone();
        let config = self.config.clone();

        tokio::spawn(async move {
            run_io_loop(ws_stream, cmd_rx, event_tx, io_state, config, state_tx).await;
        });

        let handle = WsHandle {
            cmd_tx,
            state: state.clone(),
            state_rx,
        };

        handle.wait_for_auth().await?;

        let stream = Box::pin(futures::stream::unfold(event_rx, |mut rx| async move {
            rx.recv().await.map(|batch| (batch, rx))
        }));

        Ok((handle, stream))
    }
}

impl WsHandle {
    /// Subscribe to topics. Persisted and restored on reconnection.
    pub async fn subscribe(&self, topics: &[Subscription]) -> Result<(), EngineError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(WsCommand::Subscribe(topics.to_vec(), tx))
            .await
            .map_err(|_| EngineError::Listener("command channel closed".into()))?;
        rx.await
            .map_err(|_| EngineError::Listener("command channel closed".into()))?
    }

    /// Unsubscribe from topics.
    pub async fn unsubscribe(&self, topics: &[Subscription]) -> Result<(), EngineError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(WsCommand::Unsubscribe(topics.to_vec(), tx))
            .await
            .map_err(|_| EngineError::Listener("command channel closed".into()))?;
        rx.await
            .map_err(|_| EngineError::Listener("command channel closed".into()))?
    }

    /// Close the connection gracefully.
    pub async fn close(&self) -> Result<(), EngineError> {
        self.state.shutdown.store(true, Ordering::Release);
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(WsCommand::Close(tx)).await;
        let _ = rx.await;
        Ok(())
    }

    /// Check if authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.state.authenticated.load(Ordering::Acquire)
    }

    /// Get current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Get current subscriptions.
    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.state.subscriptions.lock().unwrap().clone()
    }

    /// Get connection statistics.
    pub fn stats(&self) -> WsStats {
        let last_msg = self.state.last_message_time.load(Ordering::Acquire);
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_millis() as u64;

        WsStats {
            message_count: self.state.message_count.load(Ordering::Acquire),
            last_message_age: Duration::from_millis(now.saturating_sub(last_msg)),
            reconnect_count: self.state.reconnect_count.load(Ordering::Acquire),
            subscription_count: self.state.subscriptions.lock().unwrap().len(),
        }
    }

    /// Wait for authentication to complete.
    async fn wait_for_auth(&self) -> Result<(), EngineError> {
        let start = Instant::now();
        let timeout = Duration::from_secs(10);

        while start.elapsed() < timeout {
            if self.is_authenticated() {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        Err(EngineError::Listener("timeout waiting for auth".into()))
    }
}

impl std::fmt::Debug for WsHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsHandle")
            .field("authenticated", &self.is_authenticated())
            .field("connection_state", &self.connection_state())
            .field("subscription_count", &self.state.subscriptions.lock().unwrap().len())
            .finish()
    }
}

/// Main IO loop with reconnection support.
async fn run_io_loop<S>(
    initial_stream: S,
    mut cmd_rx: mpsc::Receiver<WsCommand>,
    event_tx: mpsc::Sender<Result<WsMessageBatch, EngineError>>,
    state: Arc<WsState>,
    config: ListenerConfig,
    state_tx: watch::Sender<ConnectionState>,
) where
    S: futures::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>>
        + futures::Sink<Message, Error = tokio_tungstenite::tungstenite::Error>
        + Unpin
        + Send,
{
    let (write, read) = initial_stream.split();

    let result = run_connection(write, read, &mut cmd_rx, &event_tx, &state, &config, &state_tx).await;

    if result.is_ok() || state.shutdown.load(Ordering::Acquire) {
        info!("connection closed cleanly");
        let _ = state_tx.send(ConnectionState::Disconnected);
        return;
    }

    let mut attempt = 0u32;

    loop {
        if state.shutdown.load(Ordering::Acquire) {
            info!("shutdown requested, exiting IO loop");
            break;
        }

        attempt += 1;
        state.reconnect_count.store(attempt, Ordering::Release);
        let _ = state_tx.send(ConnectionState::Reconnecting(attempt));

        if !config.reconnect.should_retry(attempt) {
            error!(attempt, "max reconnection attempts reached");
            let _ = state_tx.send(ConnectionState::Disconnected);
            break;
        }

        let delay = config.reconnect.delay_for_attempt(attempt);
        info!(attempt, ?delay, "reconnecting after delay");
        tokio::time::sleep(delay).await;

        let (ws_stream, _) = match connect_async(config.url.as_str()).await {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, attempt, "reconnection failed");
                continue;
            }
        };

        info!(attempt, "reconnected successfully");
        state.authenticated.store(false, Ordering::Release);

        let (write, read) = ws_stream.split();

        match run_connection(write, read, &mut cmd_rx, &event_tx, &state, &config, &state_tx).await {
            Ok(()) => {
                info!("connection closed cleanly after reconnect");
                let _ = state_tx.send(ConnectionState::Disconnected);
                break;
            }
            Err(e) => {
                warn!(error = %e, "connection error, will reconnect");
                continue;
            }
        }
    }
}

/// Handle a single WebSocket connection.
#[allow(clippy::too_many_arguments)]
async fn run_connection<W, R>(
    mut write: W,
    mut read: R,
    cmd_rx: &mut mpsc::Receiver<WsCommand>,
    event_tx: &mpsc::Sender<Result<WsMessageBatch, EngineError>>,
    state: &Arc<WsState>,
    config: &ListenerConfig,
    state_tx: &watch::Sender<ConnectionState>,
) -> Result<(), EngineError>
where
    W: futures::Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
    R: futures::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    let auth_msg = WsAuthMessage::new(config.api_key.expose());
    let auth_json = serde_json::to_string(&auth_msg)
        .map_err(|_| EngineError::InvalidArgument("failed to serialize auth message"))?;
    write
        .send(Message::Text(auth_json))
        .await
        .map_err(|e| EngineError::Listener(e.to_string()))?;

    debug!("sent authentication message");

    let subs: Vec<_> = state.subscriptions.lock().unwrap().clone();
    if !subs.is_empty() {
        let msg = WsSubscribeMessage::subscribe(&subs);
        let sub_json = serde_json::to_string(&msg)
            .map_err(|_| EngineError::InvalidArgument("failed to serialize subscribe message"))?;
        write
            .send(Message::Text(sub_json))
            .await
            .map_err(|e| EngineError::Listener(e.to_string()))?;
        debug!(count = subs.len(), "resubscribed to existing topics");
    }

    let mut ping_interval = tokio::time::interval(Duration::from_secs(20));
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let mut last_activity = Instant::now();

    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        last_activity = Instant::now();
                        let received_at = Instant::now();
                        let now_ms = std::time::SystemTime::now()
                            .duration_since(std::time::UNIX_EPOCH)
                            .unwrap_or(Duration::ZERO)
                            .as_millis() as u64;
                        state.last_message_time.store(now_ms, Ordering::Release);
                        state.message_count.fetch_add(1, Ordering::AcqRel);

                        match parse_ws_message(&text) {
                            Ok(events) => {
                                for event in &events {
                                    if let WsEvent::Status(status) = event {
                                        if status.is_auth_success() {
                                            state.authenticated.store(true, Ordering::Release);
                                            let _ = state_tx.send(ConnectionState::Connected);
                                            info!("listener authenticated");
                                        } else if status.is_auth_failed() {
                                            error!("listener authentication failed: {:?}", status.message);
                                            return Err(EngineError::Listener(
                                                status.message.clone().unwrap_or_default(),
                                            ));
                                        }
                                    }
                                }

                                let batch = WsMessageBatch { events, received_at };
                                if event_tx.send(Ok(batch)).await.is_err() {
                                    return Err(EngineError::Listener("event channel closed".into()));
                                }
                            }
                            Err(e) => {
                                warn!(error = %e, text = %text, "failed to parse frame, dropping it");
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        last_activity = Instant::now();
                        write.send(Message::Pong(data)).await
                            .map_err(|e| EngineError::Listener(e.to_string()))?;
                    }
                    Some(Ok(Message::Pong(_))) => {
                        last_activity = Instant::now();
                    }
                    Some(Ok(Message::Close(frame))) => {
                        info!(?frame, "connection closed by server");
                        return Err(EngineError::Listener("disconnected".into()));
                    }
                    Some(Ok(Message::Binary(_))) | Some(Ok(Message::Frame(_))) => {}
                    Some(Err(e)) => {
                        error!(error = %e, "transport error");
                        return Err(EngineError::Listener(e.to_string()));
                    }
                    None => {
                        info!("stream ended");
                        return Err(EngineError::Listener("disconnected".into()));
                    }
                }
            }

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(WsCommand::Subscribe(topics, reply)) => {
                        let msg = WsSubscribeMessage::subscribe(&topics);
                        let result = match serde_json::to_string(&msg) {
                            Ok(json) => write.send(Message::Text(json)).await
                                .map_err(|e| EngineError::Listener(e.to_string())),
                            Err(_) => Err(EngineError::InvalidArgument("failed to serialize subscribe message")),
                        };
                        if result.is_ok() {
                            let mut subs = state.subscriptions.lock().unwrap();
                            subs.extend(topics);
                        }
                        let _ = reply.send(result);
                    }
                    Some(WsCommand::Unsubscribe(topics, reply)) => {
                        let msg = WsSubscribeMessage::unsubscribe(&topics);
                        let result = match serde_json::to_string(&msg) {
                            Ok(json) => write.send(Message::Text(json)).await
                                .map_err(|e| EngineError::Listener(e.to_string())),
                            Err(_) => Err(EngineError::InvalidArgument("failed to serialize unsubscribe message")),
                        };
                        if result.is_ok() {
                            let mut subs = state.subscriptions.lock().unwrap();
                            subs.retain(|s| !topics.contains(s));
                        }
                        let _ = reply.send(result);
                    }
                    Some(WsCommand::Close(reply)) => {
                        let _ = write.send(Message::Close(None)).await;
                        let _ = reply.send(());
                        return Ok(());
                    }
                    None => return Ok(()),
                }
            }

            _ = ping_interval.tick() => {
                if last_activity.elapsed() > config.idle_timeout {
                    warn!("connection idle, sending ping");
                }
                if let Err(e) = write.send(Message::Ping(vec![])).await {
                    warn!(error = %e, "failed to send ping");
                    return Err(EngineError::Listener(e.to_string()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_message_batch() {
        let batch = WsMessageBatch {
            events: vec![WsEvent::Unknown],
            received_at: Instant::now(),
        };
        assert_eq!(batch.events.len(), 1);
    }

    #[test]
    fn test_ws_client_empty_api_key_fails() {
        let config = ListenerConfig::default();
        let result = WsClient::new(config);
        assert!(result.is_err());
        match result {
            Err(EngineError::Configuration { message }) => {
                assert!(message.contains("empty"));
            }
            _ => panic!("expected EngineError::Configuration"),
        }
    }

    #[test]
    fn test_connection_state_debug() {
        assert_eq!(format!("{:?}", ConnectionState::Connecting), "Connecting");
        assert_eq!(format!("{:?}", ConnectionState::Reconnecting(3)), "Reconnecting(3)");
    }

    #[test]
    fn test_ws_stats() {
        let state = Arc::new(WsState {
            authenticated: AtomicBool::new(true),
            subscriptions: Mutex::new(vec![Subscription::quote("NVDA")]),
            last_message_time: AtomicU64::new(0),
            message_count: AtomicU64::new(42),
            reconnect_count: AtomicU32::new(2),
            shutdown: AtomicBool::new(false),
        });

        let (_, state_rx) = watch::channel(ConnectionState::Connected);
        let (cmd_tx, _) = mpsc::channel(1);

        let handle = WsHandle { cmd_tx, state, state_rx };

        let stats = handle.stats();
        assert_eq!(stats.message_count, 42);
        assert_eq!(stats.reconnect_count, 2);
        assert_eq!(stats.subscription_count, 1);
    }
}
