//! WebSocket push channel speaking Socket.IO v4.
//!
//! A single background task owns the socket. It performs the Engine.IO
//! handshake and answers heartbeats. It drops the socket when the server
//! falls silent for longer than the handshake allows, dispatches inbound
//! events to the handler registry and writes frames queued by
//! [`Transport::emit`]. When the socket
//! drops or an attempt fails the task retries according to the
//! [`ReconnectPolicy`], then exits once the attempts are exhausted.

use ab_protocol::{names, ClientConfig};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};
use url::Url;

use super::backoff::ReconnectPolicy;
use super::codec::Packet;
use super::error::TransportError;
use super::registry::{Handler, HandlerId, HandlerRegistry};
use super::Transport;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long `disconnect` waits for the goodbye frame before aborting.
const CLOSE_GRACE: Duration = Duration::from_millis(250);

/// State shared between the transport handle and its connection task.
struct Shared {
    registry: HandlerRegistry,
    connected: AtomicBool,
    outbound: Mutex<Option<mpsc::UnboundedSender<String>>>,
}

impl Shared {
    /// Record a connection transition and announce it to handlers.
    fn set_connected(&self, connected: bool) {
        if self.connected.swap(connected, Ordering::SeqCst) != connected {
            info!(connected, "push channel status changed");
            self.registry.dispatch(
                names::CONNECTION_STATUS,
                &json!({ "connected": connected }),
            );
        }
    }

    fn report_error(&self, error: &TransportError) {
        warn!(error = %error, "push channel error");
        self.registry.dispatch(
            names::CONNECTION_ERROR,
            &json!({ "message": error.to_string() }),
        );
    }

    /// Report that no channel can be opened at all.
    fn report_unavailable(&self, error: &TransportError) {
        self.connected.store(false, Ordering::SeqCst);
        self.registry
            .dispatch(names::CONNECTION_STATUS, &json!({ "connected": false }));
        self.report_error(error);
    }
}

/// Socket.IO client over a single WebSocket.
pub struct SocketTransport {
    socket_url: String,
    policy: ReconnectPolicy,
    shared: Arc<Shared>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SocketTransport {
    /// Create a transport for the given server origin (`http(s)://` or
    /// `ws(s)://`). Nothing happens until [`Transport::connect`].
    pub fn new(socket_url: impl Into<String>, policy: ReconnectPolicy) -> Self {
        Self {
            socket_url: socket_url.into(),
            policy,
            shared: Arc::new(Shared {
                registry: HandlerRegistry::new(),
                connected: AtomicBool::new(false),
                outbound: Mutex::new(None),
            }),
            task: Mutex::new(None),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            config.server.socket_url.clone(),
            ReconnectPolicy::from(&config.reconnection),
        )
    }
}

/// Build the Engine.IO WebSocket endpoint for a server origin.
pub fn endpoint_url(socket_url: &str) -> Result<Url, TransportError> {
    let invalid = |reason: String| TransportError::InvalidUrl {
        url: socket_url.to_string(),
        reason,
    };

    let mut url = Url::parse(socket_url).map_err(|e| invalid(e.to_string()))?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(invalid(format!("unsupported scheme {other}"))),
    };
    url.set_scheme(scheme)
        .map_err(|_| invalid("cannot change scheme".to_string()))?;

    if !url.path().ends_with("/socket.io/") {
        let path = format!("{}/socket.io/", url.path().trim_end_matches('/'));
        url.set_path(&path);
    }
    url.set_query(Some("EIO=4&transport=websocket"));
    Ok(url)
}

#[async_trait]
impl Transport for SocketTransport {
    async fn connect(&self) {
        let mut task = lock(&self.task);
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            debug!("connect called while a connection task is running");
            return;
        }

        let url = match endpoint_url(&self.socket_url) {
            Ok(url) => url,
            Err(error) => {
                self.shared.report_unavailable(&error);
                return;
            }
        };

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                self.shared.report_unavailable(&TransportError::Unavailable(
                    "no async runtime".to_string(),
                ));
                return;
            }
        };

        let (tx, rx) = mpsc::unbounded_channel();
        *lock(&self.shared.outbound) = Some(tx);
        *task = Some(runtime.spawn(run_connection(
            url,
            self.policy,
            Arc::clone(&self.shared),
            rx,
        )));
    }

    fn on(&self, event: &str, handler: Handler) -> HandlerId {
        self.shared.registry.register(event, handler)
    }

    fn off(&self, event: &str, id: HandlerId) {
        self.shared.registry.unregister(event, id);
    }

    fn off_all(&self, event: &str) {
        self.shared.registry.unregister_all(event);
    }

    fn emit(&self, event: &str, payload: Value) {
        if self.is_connected() {
            let frame = Packet::event(event, payload.clone()).encode();
            if let Some(tx) = lock(&self.shared.outbound).as_ref() {
                let _ = tx.send(frame);
            }
        } else {
            debug!(event, "not connected; event only delivered locally");
        }
        self.shared.registry.dispatch(event, &payload);
    }

    async fn disconnect(&self) {
        let handle = lock(&self.task).take();
        // Closing the queue asks the session to send its goodbye frame.
        lock(&self.shared.outbound).take();

        if let Some(mut handle) = handle {
            if tokio::time::timeout(CLOSE_GRACE, &mut handle).await.is_err() {
                handle.abort();
            }
        }

        self.shared.set_connected(false);
        self.shared.registry.clear();
    }

    fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }
}

impl Drop for SocketTransport {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.task).take() {
            handle.abort();
        }
    }
}

/// Why a session ended.
enum SessionEnd {
    ClientClosed,
    ServerClosed,
}

async fn run_connection(
    url: Url,
    policy: ReconnectPolicy,
    shared: Arc<Shared>,
    mut outbound: mpsc::UnboundedReceiver<String>,
) {
    let mut attempt = 0u32;

    loop {
        debug!(%url, attempt, "opening push channel");
        match establish(&url, policy.connect_timeout).await {
            Ok(ws) => {
                attempt = 0;
                let result = session(ws, &shared, &mut outbound, policy.connect_timeout).await;
                shared.set_connected(false);
                match result {
                    Ok(SessionEnd::ClientClosed) => return,
                    Ok(SessionEnd::ServerClosed) => shared.report_error(&TransportError::Closed),
                    Err(error) => shared.report_error(&error),
                }
            }
            Err(error) => shared.report_error(&error),
        }

        attempt += 1;
        match policy.delay_for(attempt) {
            Some(delay) => {
                debug!(attempt, ?delay, "reconnecting");
                tokio::time::sleep(delay).await;
            }
            None => {
                warn!(
                    attempts = policy.max_attempts,
                    "giving up on push channel after exhausting reconnection attempts"
                );
                lock(&shared.outbound).take();
                return;
            }
        }
    }
}

async fn establish(url: &Url, timeout: Duration) -> Result<WsStream, TransportError> {
    let (ws, _response) = tokio::time::timeout(timeout, connect_async(url.as_str()))
        .await
        .map_err(|_| TransportError::Timeout(timeout))??;
    Ok(ws)
}

/// Run one connected socket until it closes.
///
/// The server must be heard from at least every `pingInterval +
/// pingTimeout`; until the handshake arrives `silence_limit` applies.
async fn session(
    ws: WsStream,
    shared: &Shared,
    outbound: &mut mpsc::UnboundedReceiver<String>,
    mut silence_limit: Duration,
) -> Result<SessionEnd, TransportError> {
    let (mut sink, mut stream) = ws.split();
    let mut namespace_open = false;
    let heartbeat = tokio::time::sleep(silence_limit);
    tokio::pin!(heartbeat);

    loop {
        tokio::select! {
            () = &mut heartbeat => {
                warn!(?silence_limit, "no frame from server; dropping push channel");
                return Err(TransportError::Timeout(silence_limit));
            }
            frame = stream.next() => {
                let text = match frame {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => return Ok(SessionEnd::ServerClosed),
                    Some(Ok(_)) => continue,
                    Some(Err(error)) => return Err(error.into()),
                };

                heartbeat
                    .as_mut()
                    .reset(tokio::time::Instant::now() + silence_limit);

                match Packet::decode(&text) {
                    Ok(Packet::Open(handshake)) => {
                        silence_limit = Duration::from_millis(
                            handshake.ping_interval.saturating_add(handshake.ping_timeout),
                        );
                        heartbeat
                            .as_mut()
                            .reset(tokio::time::Instant::now() + silence_limit);
                        debug!(
                            sid = %handshake.sid,
                            ping_interval = handshake.ping_interval,
                            ping_timeout = handshake.ping_timeout,
                            "engine.io open"
                        );
                        sink.send(Message::Text(Packet::Connect(None).encode())).await?;
                    }
                    Ok(Packet::Ping(payload)) => {
                        sink.send(Message::Text(Packet::Pong(payload).encode())).await?;
                    }
                    Ok(Packet::Connect(_)) => {
                        namespace_open = true;
                        shared.set_connected(true);
                    }
                    Ok(Packet::ConnectError(message)) => {
                        return Err(TransportError::Refused(message));
                    }
                    Ok(Packet::Event { name, data, .. }) => {
                        shared.registry.dispatch(&name, &data);
                    }
                    Ok(Packet::Disconnect) | Ok(Packet::Close) => {
                        return Ok(SessionEnd::ServerClosed);
                    }
                    Ok(_) => {}
                    Err(error) => {
                        warn!(error = %error, frame = %text, "dropping malformed packet");
                    }
                }
            }
            next = outbound.recv() => {
                match next {
                    Some(frame) if namespace_open => {
                        sink.send(Message::Text(frame)).await?;
                    }
                    Some(_) => debug!("dropping frame queued before namespace connect"),
                    None => {
                        let _ = sink.send(Message::Text(Packet::Disconnect.encode())).await;
                        let _ = sink.close().await;
                        return Ok(SessionEnd::ClientClosed);
                    }
                }
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
