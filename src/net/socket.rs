//! Realtime connection to the message server.
//!
//! The `Connection` owns a background task that keeps exactly one websocket
//! open, attaches the session token, decodes inbound frames, and reconnects
//! with capped backoff whenever the socket drops. Consumers see a single
//! ordered stream of `ConnectionEvent`s and push text with `send`.
//!
//! LIFECYCLE
//! =========
//! 1. Connect (`?session=` query or `auth` handshake frame)
//! 2. Emit `Connected`, then `Backlog` at most once, then `Inbound` per message
//! 3. On close or error emit `Disconnected`, wait, go to 1
//! 4. Dropping the handle aborts the task
//!
//! The backoff only resets once the server has delivered an event on the
//! session. A server that accepts the socket and then drops it on a bad
//! token counts as a failed attempt, so the delay keeps growing to the cap.

#[cfg(test)]
#[path = "socket_test.rs"]
mod socket_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::{SinkExt, StreamExt};
use reqwest::Url;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use super::backoff::Backoff;
use super::types::{Backlog, Message};
use super::wire::{self, ServerEvent};
use crate::config::{AuthField, ClientConfig, ReconnectPolicy};
use crate::error::ClientError;

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Events surfaced to the chat surface, in delivery order.
#[derive(Clone, Debug, PartialEq)]
pub enum ConnectionEvent {
    Connected,
    Disconnected,
    Backlog(Backlog),
    Inbound(Message),
}

/// Fire-and-forget text sink. Implemented by [`Connection`]; tests substitute
/// a recorder.
pub trait Outbound {
    /// Queue `text` for the server. Returns `false` when it was dropped.
    fn send(&self, text: &str) -> bool;
}

#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub endpoint: String,
    pub auth_field: AuthField,
    pub token: String,
    pub reconnect: ReconnectPolicy,
}

impl ConnectOptions {
    #[must_use]
    pub fn from_config(config: &ClientConfig, token: &str) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            auth_field: config.auth_field,
            token: token.to_owned(),
            reconnect: config.reconnect,
        }
    }

    /// URL actually dialled: the endpoint, plus `session=<token>` in query mode.
    ///
    /// # Errors
    ///
    /// [`ClientError::Config`] when the endpoint is not a valid URL.
    pub fn url(&self) -> Result<Url, ClientError> {
        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| ClientError::Config(format!("invalid endpoint {}: {e}", self.endpoint)))?;
        if self.auth_field == AuthField::Query {
            url.query_pairs_mut().append_pair("session", &self.token);
        }
        Ok(url)
    }
}

pub struct Connection {
    outbound: mpsc::UnboundedSender<String>,
    connected: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl Connection {
    /// Start the connection task. Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// [`ClientError::Config`] when the endpoint is not a valid URL.
    pub fn spawn(options: ConnectOptions) -> Result<(Self, mpsc::UnboundedReceiver<ConnectionEvent>), ClientError> {
        let url = options.url()?;
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let (events, events_rx) = mpsc::unbounded_channel();
        let connected = Arc::new(AtomicBool::new(false));

        let task = tokio::spawn(run(url, options, outbound_rx, events, Arc::clone(&connected)));
        Ok((Self { outbound, connected, task }, events_rx))
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Stop the connection task and close the socket.
    pub fn shutdown(self) {
        drop(self);
    }
}

impl Outbound for Connection {
    fn send(&self, text: &str) -> bool {
        if !self.is_connected() {
            warn!("not connected; dropping outbound message");
            return false;
        }
        self.outbound.send(text.to_owned()).is_ok()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.task.abort();
    }
}

enum SessionEnd {
    /// Server closed the socket; reconnect.
    Closed,
    /// Handle or event consumer went away; stop for good.
    Shutdown,
}

async fn run(
    url: Url,
    options: ConnectOptions,
    mut outbound_rx: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<ConnectionEvent>,
    connected: Arc<AtomicBool>,
) {
    let mut backoff = Backoff::new(options.reconnect);

    loop {
        match connect_async(url.as_str()).await {
            Ok((stream, _)) => {
                info!(endpoint = %options.endpoint, "connected");
                let outcome =
                    run_session(stream, &options, &mut backoff, &mut outbound_rx, &events, &connected).await;
                connected.store(false, Ordering::Release);
                match outcome {
                    Ok(SessionEnd::Shutdown) => return,
                    Ok(SessionEnd::Closed) => info!("connection closed by server"),
                    Err(e) => warn!(error = %e, "connection lost"),
                }
                if events.send(ConnectionEvent::Disconnected).is_err() {
                    return;
                }
            }
            Err(e) => {
                warn!(error = %e, attempt = backoff.attempt(), "connect failed");
            }
        }

        let delay = backoff.next_delay();
        debug!(delay_ms = delay.as_millis(), "reconnecting");
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                () = &mut sleep => break,
                dropped = outbound_rx.recv() => {
                    if dropped.is_none() {
                        return;
                    }
                    warn!("not connected; dropping outbound message");
                }
            }
        }
    }
}

async fn run_session(
    stream: WsStream,
    options: &ConnectOptions,
    backoff: &mut Backoff,
    outbound_rx: &mut mpsc::UnboundedReceiver<String>,
    events: &mpsc::UnboundedSender<ConnectionEvent>,
    connected: &AtomicBool,
) -> Result<SessionEnd, ClientError> {
    let (mut write, mut read) = stream.split();

    if options.auth_field == AuthField::AuthObject {
        write.send(WsMessage::Text(wire::encode_auth(&options.token)?.into())).await?;
    }

    connected.store(true, Ordering::Release);
    if events.send(ConnectionEvent::Connected).is_err() {
        return Ok(SessionEnd::Shutdown);
    }

    let mut backlog_delivered = false;
    loop {
        tokio::select! {
            outgoing = outbound_rx.recv() => {
                let Some(text) = outgoing else {
                    let _ = write.close().await;
                    return Ok(SessionEnd::Shutdown);
                };
                write.send(WsMessage::Text(wire::encode_message(&text)?.into())).await?;
            }
            incoming = read.next() => {
                let Some(frame) = incoming else {
                    return Ok(SessionEnd::Closed);
                };
                let event = match frame? {
                    WsMessage::Text(text) => match wire::decode_server_event(text.as_str()) {
                        Ok(Some(ServerEvent::Backlog(backlog))) => {
                            if backlog_delivered {
                                warn!("ignoring repeated previous_messages on one connection");
                                continue;
                            }
                            backlog_delivered = true;
                            ConnectionEvent::Backlog(backlog)
                        }
                        Ok(Some(ServerEvent::Message(message))) => ConnectionEvent::Inbound(message),
                        Ok(None) => {
                            debug!("ignoring unhandled event");
                            continue;
                        }
                        Err(e) => {
                            warn!(error = %e, "undecodable frame");
                            continue;
                        }
                    },
                    WsMessage::Close(_) => return Ok(SessionEnd::Closed),
                    _ => continue,
                };
                if backoff.attempt() > 0 {
                    debug!("session healthy; resetting backoff");
                    backoff.reset();
                }
                if events.send(event).is_err() {
                    return Ok(SessionEnd::Shutdown);
                }
            }
        }
    }
}
