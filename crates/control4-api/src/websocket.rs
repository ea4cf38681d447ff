//! Director item-update stream with auto-reconnect.
//!
//! Connects to the Director's socket.io endpoint (Engine.IO v3 over a
//! websocket), allocates an item-update subscription, and streams parsed
//! updates through a [`tokio::sync::broadcast`] channel. Reconnects with
//! exponential backoff + jitter until cancelled.
//!
//! # Example
//!
//! ```rust,ignore
//! use control4_api::websocket::{DirectorEventStream, ReconnectConfig};
//! use control4_api::TransportConfig;
//! use tokio_util::sync::CancellationToken;
//!
//! let cancel = CancellationToken::new();
//! let stream = DirectorEventStream::connect(
//!     &director,
//!     &TransportConfig::director(),
//!     ReconnectConfig::default(),
//!     cancel.clone(),
//! )?;
//!
//! let mut kitchen = stream.subscribe_item(42);
//! while let Some(update) = kitchen.recv().await {
//!     println!("{:?} = {:?}", update.var_name, update.value);
//! }
//!
//! stream.shutdown();
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_tungstenite::Connector;
use tokio_tungstenite::tungstenite::{self, ClientRequestBuilder};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};
use url::Url;

use crate::director::DirectorClient;
use crate::director::variables::defined;
use crate::error::Error;
use crate::response::{decode, read_body};
use crate::transport::TransportConfig;

// ── Broadcast channel capacity ───────────────────────────────────────

const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Engine.IO default until the server's open packet says otherwise.
const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(25);

const SUBSCRIPTION_PATH: &str = "/api/v1/items/datatoui";

// ── Events ───────────────────────────────────────────────────────────

/// One variable change pushed by the Director.
///
/// `value` is `None` when the Director reports `"Undefined"`. Fields the
/// Director adds beyond the core set are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemUpdate {
    #[serde(rename = "iddevice")]
    pub item_id: u32,

    #[serde(default, rename = "varName")]
    pub var_name: Option<String>,

    #[serde(default)]
    pub value: Option<Value>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Everything the stream broadcasts.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectorEvent {
    /// socket.io session established (also after every reconnect).
    Connected,
    /// The socket dropped; a reconnect follows unless cancelled.
    Disconnected,
    Item(ItemUpdate),
}

// ── ReconnectConfig ──────────────────────────────────────────────────

/// How long the stream waits between Director socket sessions.
///
/// Every reconnect waits at least `initial_delay`, including after the
/// Director closes the socket cleanly. The delay doubles for each session
/// in a row that ends before an item-update subscription was started.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Wait before reconnecting after a session that was subscribed.
    pub initial_delay: Duration,

    /// Ceiling for the doubled wait (before jitter).
    pub max_delay: Duration,

    /// Unsubscribed sessions in a row to tolerate before the stream stops.
    /// `None` keeps reconnecting until cancelled.
    pub max_retries: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: None,
        }
    }
}

// ── DirectorEventStream ──────────────────────────────────────────────

/// Handle to a running item-update stream.
///
/// The director token is only checked when the Director allocates the
/// subscription; once it expires (usually after 86400 s) the Director
/// stops sending updates. Reconnect with a fresh token at that point.
pub struct DirectorEventStream {
    event_rx: broadcast::Receiver<Arc<DirectorEvent>>,
    cancel: CancellationToken,
}

impl DirectorEventStream {
    /// Spawn the connection loop for `director`'s address and token.
    ///
    /// Returns once the background task is spawned; the first connection
    /// attempt happens asynchronously. Must be called inside a tokio runtime.
    pub fn connect(
        director: &DirectorClient,
        transport: &TransportConfig,
        reconnect: ReconnectConfig,
        cancel: CancellationToken,
    ) -> Result<Self, Error> {
        let ws_url = socket_url(director.base_url())?;
        Self::connect_to(ws_url, director, transport, reconnect, cancel)
    }

    /// Like [`connect`](Self::connect), but open the socket at `ws_url`
    /// instead of the one derived from the Director address (for a Director
    /// reached through a proxy or port forward). The subscription request
    /// still goes to the Director's REST address.
    pub fn connect_to(
        ws_url: Url,
        director: &DirectorClient,
        transport: &TransportConfig,
        reconnect: ReconnectConfig,
        cancel: CancellationToken,
    ) -> Result<Self, Error> {
        let session = Session {
            ws_url,
            base_url: director.base_url().clone(),
            http: director.http().clone(),
            token: director.token().clone(),
            connector: transport.websocket_connector()?,
        };

        let (event_tx, event_rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            ws_loop(session, event_tx, reconnect, task_cancel).await;
        });

        Ok(Self { event_rx, cancel })
    }

    /// Get a new receiver for every event on the stream.
    ///
    /// A consumer that falls behind receives
    /// [`broadcast::error::RecvError::Lagged`].
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DirectorEvent>> {
        self.event_rx.resubscribe()
    }

    /// Get a receiver for the updates of a single item.
    pub fn subscribe_item(&self, item_id: u32) -> ItemUpdates {
        ItemUpdates {
            item_id,
            rx: self.subscribe(),
        }
    }

    /// Signal the background task to shut down.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

/// Updates for one item, filtered out of the full event stream.
pub struct ItemUpdates {
    item_id: u32,
    rx: broadcast::Receiver<Arc<DirectorEvent>>,
}

impl ItemUpdates {
    pub fn item_id(&self) -> u32 {
        self.item_id
    }

    /// Wait for the next update of this item. `None` once the stream is
    /// shut down. Lagged updates are skipped.
    pub async fn recv(&mut self) -> Option<ItemUpdate> {
        loop {
            match self.rx.recv().await {
                Ok(event) => {
                    if let DirectorEvent::Item(update) = event.as_ref() {
                        if update.item_id == self.item_id {
                            return Some(update.clone());
                        }
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(item_id = self.item_id, skipped, "item update receiver lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

// ── Background reconnection loop ─────────────────────────────────────

/// Everything one connection attempt needs, owned by the background task.
struct Session {
    ws_url: Url,
    base_url: Url,
    http: reqwest::Client,
    token: SecretString,
    connector: Option<Connector>,
}

/// How far one session got before it ended.
#[derive(Debug, Default)]
struct SessionProgress {
    /// socket.io connect packet seen; `Connected` was broadcast.
    connected: bool,
    /// `startSubscription` was sent.
    subscribed: bool,
}

/// Main loop: connect, read until the session ends, wait, reconnect.
///
/// The wait applies after clean closes as well as errors. Only a session
/// that reached a subscription resets the backoff.
async fn ws_loop(
    session: Session,
    event_tx: broadcast::Sender<Arc<DirectorEvent>>,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
) {
    let mut attempt: u32 = 0;

    loop {
        let mut progress = SessionProgress::default();
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = connect_and_read(&session, &event_tx, &cancel, &mut progress) => result,
        };

        if progress.connected {
            let _ = event_tx.send(Arc::new(DirectorEvent::Disconnected));
        }
        if cancel.is_cancelled() {
            break;
        }
        if progress.subscribed {
            attempt = 0;
        }

        match result {
            Ok(()) => info!(attempt, "director socket closed"),
            Err(e) => warn!(error = %e, attempt, "director socket error"),
        }

        if let Some(max) = reconnect.max_retries {
            if attempt >= max {
                error!(max_retries = max, "director socket reconnection limit reached, giving up");
                break;
            }
        }

        let delay = calculate_backoff(attempt, &reconnect);
        debug!(?delay, attempt, "waiting before reconnect");

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(delay) => {}
        }

        attempt = attempt.saturating_add(1);
    }

    debug!("director socket loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Open one socket, run the subscription handshake, and read until it drops.
async fn connect_and_read(
    session: &Session,
    event_tx: &broadcast::Sender<Arc<DirectorEvent>>,
    cancel: &CancellationToken,
    progress: &mut SessionProgress,
) -> Result<(), Error> {
    info!(url = %session.ws_url, "connecting to director socket");

    let uri: tungstenite::http::Uri = session
        .ws_url
        .as_str()
        .parse()
        .map_err(|e: tungstenite::http::uri::InvalidUri| Error::WebSocketConnect(e.to_string()))?;

    let request = ClientRequestBuilder::new(uri)
        .with_header("JWT", session.token.expose_secret().to_owned());

    let (ws_stream, _response) =
        tokio_tungstenite::connect_async_tls_with_config(request, None, false, session.connector.clone())
            .await
            .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

    let (mut write, mut read) = ws_stream.split();
    let mut subscription_id: Option<String> = None;
    let mut ping = ping_timer(DEFAULT_PING_INTERVAL);

    loop {
        let frame = tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(()),
            _ = ping.tick() => {
                trace!("engine.io ping");
                send_text(&mut write, "2").await?;
                continue;
            }
            frame = read.next() => frame,
        };

        let text = match frame {
            Some(Ok(tungstenite::Message::Text(text))) => text,
            Some(Ok(tungstenite::Message::Close(frame))) => {
                if let Some(cf) = frame {
                    info!(code = %cf.code, reason = %cf.reason, "director socket close frame received");
                }
                return Ok(());
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(Error::WebSocketConnect(e.to_string())),
            None => {
                info!("director socket stream ended");
                return Ok(());
            }
        };

        match parse_packet(&text) {
            Packet::Open { ping_interval } => {
                debug!(?ping_interval, "engine.io session opened");
                ping = ping_timer(ping_interval);
            }
            Packet::Ping => send_text(&mut write, "3").await?,
            Packet::Pong => trace!("engine.io pong"),
            Packet::Close | Packet::Disconnect => return Ok(()),
            Packet::Connect => {
                debug!("socket.io connected");
                progress.connected = true;
                let _ = event_tx.send(Arc::new(DirectorEvent::Connected));
            }
            Packet::ConnectError(message) => return Err(Error::WebSocketConnect(message)),
            Packet::Event { name, args } => match name.as_str() {
                "clientId" if subscription_id.is_none() => {
                    let Some(client_id) = args.first().and_then(value_as_id) else {
                        warn!("clientId event without an id");
                        continue;
                    };
                    let id = fetch_subscription(session, &client_id).await?;
                    send_text(&mut write, &encode_event("startSubscription", &Value::String(id.clone()))).await?;
                    debug!(subscription_id = %id, "item-update subscription started");
                    subscription_id = Some(id);
                    progress.subscribed = true;
                }
                _ if subscription_id.as_deref() == Some(name.as_str()) => {
                    if let Some(payload) = args.first() {
                        dispatch(payload, event_tx);
                    }
                }
                _ => trace!(event = %name, "ignoring socket.io event"),
            },
            Packet::Ignored => trace!("ignoring engine.io frame"),
        }
    }
}

fn ping_timer(period: Duration) -> tokio::time::Interval {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn send_text<S>(write: &mut S, text: &str) -> Result<(), Error>
where
    S: futures_util::Sink<tungstenite::Message, Error = tungstenite::Error> + Unpin,
{
    write
        .send(tungstenite::Message::text(text.to_owned()))
        .await
        .map_err(|e| Error::WebSocketConnect(e.to_string()))
}

/// `wss://{director}/socket.io/?EIO=3&transport=websocket`
fn socket_url(base: &Url) -> Result<Url, Error> {
    let mut url = base.join("/socket.io/")?;
    let scheme = if base.scheme() == "http" { "ws" } else { "wss" };
    url.set_scheme(scheme)
        .map_err(|()| Error::WebSocketConnect(format!("cannot derive socket URL from {base}")))?;
    url.set_query(Some("EIO=3&transport=websocket"));
    Ok(url)
}

/// Ask the Director for an item-update subscription bound to a socket.io
/// client id.
///
/// The token travels in the query string, so the request URL is never
/// logged and is stripped from transport errors.
async fn fetch_subscription(session: &Session, client_id: &str) -> Result<String, Error> {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct SubscriptionReply {
        subscription_id: Value,
    }

    let mut url = session.base_url.join(SUBSCRIPTION_PATH)?;
    url.query_pairs_mut()
        .append_pair("JWT", session.token.expose_secret())
        .append_pair("SubscriptionClient", client_id);
    debug!(client_id, "requesting item-update subscription");

    let resp = session
        .http
        .get(url)
        .send()
        .await
        .map_err(|e| Error::Transport(e.without_url()))?;
    let body = read_body(resp).await.map_err(without_url)?;
    let reply: SubscriptionReply = decode(&body)?;
    value_as_id(&reply.subscription_id).ok_or_else(|| Error::Deserialization {
        message: "subscriptionId is neither a string nor a number".into(),
        body: reply.subscription_id.to_string(),
    })
}

fn without_url(err: Error) -> Error {
    match err {
        Error::Transport(e) => Error::Transport(e.without_url()),
        other => other,
    }
}

fn value_as_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ── Message parsing ──────────────────────────────────────────────────

/// The Engine.IO / socket.io packets we act on.
#[derive(Debug, PartialEq)]
enum Packet {
    Open { ping_interval: Duration },
    Close,
    Ping,
    Pong,
    Connect,
    Disconnect,
    ConnectError(String),
    Event { name: String, args: Vec<Value> },
    Ignored,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OpenInfo {
    #[serde(default)]
    ping_interval: Option<u64>,
}

/// Parse one Engine.IO v3 text frame.
fn parse_packet(text: &str) -> Packet {
    let Some(kind) = text.chars().next() else {
        return Packet::Ignored;
    };
    let rest = &text[kind.len_utf8()..];

    match kind {
        '0' => {
            let ping_interval = serde_json::from_str::<OpenInfo>(rest)
                .ok()
                .and_then(|info| info.ping_interval)
                .map_or(DEFAULT_PING_INTERVAL, Duration::from_millis);
            Packet::Open { ping_interval }
        }
        '1' => Packet::Close,
        '2' => Packet::Ping,
        '3' => Packet::Pong,
        '4' => parse_message(rest),
        _ => Packet::Ignored,
    }
}

/// Parse the socket.io packet carried by an Engine.IO message.
fn parse_message(text: &str) -> Packet {
    let Some(kind) = text.chars().next() else {
        return Packet::Ignored;
    };
    let rest = &text[kind.len_utf8()..];

    match kind {
        '0' => Packet::Connect,
        '1' => Packet::Disconnect,
        '2' => {
            // Optional "/namespace," and ack id precede the JSON array.
            let Some(start) = rest.find('[') else {
                return Packet::Ignored;
            };
            let Ok(mut items) = serde_json::from_str::<Vec<Value>>(&rest[start..]) else {
                debug!("malformed socket.io event payload");
                return Packet::Ignored;
            };
            if items.is_empty() {
                return Packet::Ignored;
            }
            match items.remove(0) {
                Value::String(name) => Packet::Event { name, args: items },
                _ => Packet::Ignored,
            }
        }
        '4' => Packet::ConnectError(rest.to_owned()),
        _ => Packet::Ignored,
    }
}

/// `42["name",arg]`
fn encode_event(name: &str, arg: &Value) -> String {
    format!("42{}", Value::Array(vec![Value::String(name.to_owned()), arg.clone()]))
}

/// Broadcast the item updates carried by one subscription event.
///
/// The payload is a single update, a list of them, or a status message.
fn dispatch(payload: &Value, event_tx: &broadcast::Sender<Arc<DirectorEvent>>) {
    if let Some(status) = payload.get("status") {
        debug!(%status, "item-update subscription status");
        return;
    }

    let updates = match payload {
        Value::Array(items) => items.as_slice(),
        single => std::slice::from_ref(single),
    };

    for raw in updates {
        match serde_json::from_value::<ItemUpdate>(raw.clone()) {
            Ok(mut update) => {
                update.value = update.value.and_then(defined);
                trace!(item_id = update.item_id, var = ?update.var_name, "item update");
                // No subscribers right now is fine.
                let _ = event_tx.send(Arc::new(DirectorEvent::Item(update)));
            }
            Err(e) => debug!(error = %e, "skipping unrecognized item update"),
        }
    }
}

// ── Backoff calculation ──────────────────────────────────────────────

/// Exponential backoff with jitter.
///
/// `delay = min(initial * 2^attempt, max) * (1 +- 0.25)`
fn calculate_backoff(attempt: u32, config: &ReconnectConfig) -> Duration {
    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(exponent);
    let capped = base.min(config.max_delay.as_secs_f64());

    // Deterministic jitter seeded from the attempt number.
    let jitter_factor = 1.0 + 0.25 * (f64::from(attempt) * 7.3).sin();
    Duration::from_secs_f64((capped * jitter_factor).max(0.0))
}

// ── Tests ────────────────────────────────────────────────────────────
