//! The debate client — transport lifecycle and inbound dispatch

use crate::backoff::backoff_delay;
use conclave_core::{ClientCommand, ConnectionState, Error, ServerEvent};
use conclave_state::DebateStore;
use futures::{SinkExt, StreamExt};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMsg};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Connection configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// WebSocket endpoint, e.g. `ws://127.0.0.1:9170/ws`.
    pub url: String,
    pub initial_delay: Duration,
    pub max_retries: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:9170/ws".to_string(),
            initial_delay: Duration::from_millis(1000),
            max_retries: 5,
        }
    }
}

struct Shared {
    store: Arc<DebateStore>,
    /// Sender into the live connection's write half; `None` while the
    /// transport is not open.
    outbound: Mutex<Option<mpsc::UnboundedSender<String>>>,
    cancel: CancellationToken,
    retry: Notify,
}

/// Why the drive loop returned.
enum CloseReason {
    Cancelled,
    Dropped,
}

/// Client for the debate backend. One instance per connection lifecycle;
/// dropping it cancels any pending reconnect timer and closes the
/// transport.
pub struct DebateClient {
    config: ClientConfig,
    shared: Arc<Shared>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl DebateClient {
    pub fn new(config: ClientConfig, store: Arc<DebateStore>) -> Self {
        Self {
            config,
            shared: Arc::new(Shared {
                store,
                outbound: Mutex::new(None),
                cancel: CancellationToken::new(),
                retry: Notify::new(),
            }),
            task: Mutex::new(None),
        }
    }

    /// Establish the transport and keep it alive across drops until
    /// retries are exhausted. Idempotent: a second call while the
    /// connection task is running is a no-op.
    pub fn connect(&self) {
        let mut task = self.task.lock().expect("client task poisoned");
        if task.as_ref().map(|t| !t.is_finished()).unwrap_or(false) {
            return;
        }
        let shared = self.shared.clone();
        let config = self.config.clone();
        *task = Some(tokio::spawn(run(shared, config)));
    }

    /// Send one command. Returns `false` without queuing when the
    /// transport is not open; the caller treats that as back-pressure.
    pub fn send(&self, command: &ClientCommand) -> bool {
        let json = match serde_json::to_string(command) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to encode command: {}", e);
                return false;
            }
        };
        let outbound = self.shared.outbound.lock().expect("outbound poisoned");
        match outbound.as_ref() {
            Some(tx) => tx.send(json).is_ok(),
            None => false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.shared
            .outbound
            .lock()
            .expect("outbound poisoned")
            .is_some()
    }

    /// Manual retry after exhaustion: clears the surfaced error, resets
    /// the attempt counter, and reconnects.
    pub fn retry(&self) {
        self.shared.store.clear_error();
        self.shared.retry.notify_one();
        // If the task already exited (or was never started), restart it.
        self.connect();
    }

    /// Tear down: cancel any pending retry timer and close the live
    /// transport. Safe to call more than once.
    pub fn close(&self) {
        self.shared.cancel.cancel();
    }
}

impl Drop for DebateClient {
    fn drop(&mut self) {
        self.shared.cancel.cancel();
    }
}

/// Connection loop: connect, drive, back off, reconnect; surface a
/// terminal error after `max_retries` failed attempts and wait for a
/// manual retry.
async fn run(shared: Arc<Shared>, config: ClientConfig) {
    let mut attempt: u32 = 0;

    loop {
        if shared.cancel.is_cancelled() {
            return;
        }
        shared.store.set_connection(ConnectionState::Connecting);

        match connect_async(&config.url).await {
            Ok((stream, _)) => {
                info!("Connected to {}", config.url);
                // Each successful open resets the attempt counter.
                attempt = 0;
                shared.store.set_connection(ConnectionState::Connected);
                match drive(stream, &shared).await {
                    CloseReason::Cancelled => {
                        shared.store.set_connection(ConnectionState::Disconnected);
                        return;
                    }
                    CloseReason::Dropped => {
                        shared.store.set_connection(ConnectionState::Disconnected);
                    }
                }
            }
            Err(e) => {
                warn!("Connect to {} failed: {}", config.url, e);
                shared.store.set_connection(ConnectionState::Error);
            }
        }

        if attempt >= config.max_retries {
            let err = Error::RetriesExhausted {
                attempts: config.max_retries,
            };
            warn!("{}", err);
            shared.store.set_fatal_error(err.to_string());
            tokio::select! {
                _ = shared.cancel.cancelled() => return,
                _ = shared.retry.notified() => {
                    info!("Manual retry requested");
                    attempt = 0;
                    continue;
                }
            }
        }

        let delay = backoff_delay(config.initial_delay, attempt);
        attempt += 1;
        debug!("Reconnecting in {:?} (attempt {})", delay, attempt);
        tokio::select! {
            _ = shared.cancel.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Pump one live connection until it drops or the client is torn down.
async fn drive(stream: WsStream, shared: &Arc<Shared>) -> CloseReason {
    let (mut ws_tx, mut ws_rx) = stream.split();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
    *shared.outbound.lock().expect("outbound poisoned") = Some(out_tx);

    let reason = loop {
        tokio::select! {
            _ = shared.cancel.cancelled() => {
                let _ = ws_tx.send(WsMsg::Close(None)).await;
                break CloseReason::Cancelled;
            }

            outgoing = out_rx.recv() => {
                // The sender lives in `shared.outbound`, so recv only
                // returns None after we clear it below.
                if let Some(json) = outgoing {
                    if ws_tx.send(WsMsg::Text(json)).await.is_err() {
                        break CloseReason::Dropped;
                    }
                }
            }

            incoming = ws_rx.next() => {
                match incoming {
                    Some(Ok(WsMsg::Text(text))) => handle_frame(&shared.store, &text),
                    Some(Ok(WsMsg::Ping(payload))) => {
                        let _ = ws_tx.send(WsMsg::Pong(payload)).await;
                    }
                    Some(Ok(WsMsg::Close(_))) | None => {
                        info!("Server closed the connection");
                        break CloseReason::Dropped;
                    }
                    Some(Err(e)) => {
                        warn!("WebSocket error: {}", e);
                        break CloseReason::Dropped;
                    }
                    _ => {} // Binary, Pong: ignore
                }
            }
        }
    };

    *shared.outbound.lock().expect("outbound poisoned") = None;
    reason
}

/// Parse and dispatch one inbound frame. Malformed payloads are logged
/// and dropped; one bad frame must never take the connection down.
fn handle_frame(store: &DebateStore, text: &str) {
    match serde_json::from_str::<ServerEvent>(text) {
        Ok(event) => store.dispatch(event),
        Err(e) => {
            warn!(
                "Dropping malformed frame ({}): {}",
                e,
                &text[..text.len().min(120)]
            );
        }
    }
}
