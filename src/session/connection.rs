//! Inference stream connection
//!
//! One WebSocket per session. A single pump task owns the socket for its whole
//! lifetime: it writes queued outbound text and forwards every inbound text
//! frame, in arrival order, onto the session event queue. Connection state is
//! only changed by the session controller as it handles those events.

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use super::SessionEvent;

/// Lifecycle of the duplex channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
    Errored,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("Connection is not open ({0:?})")]
    NotOpen(ConnectionState),
    #[error("Connection pump has stopped")]
    PumpStopped,
}

/// The controller's view of a duplex text channel
pub trait Channel: Send {
    fn state(&self) -> ConnectionState;

    /// Record a transition observed on the event queue
    fn transition(&mut self, state: ConnectionState);

    /// Queue raw text for transmission. Requires `Open`.
    fn send(&mut self, text: &str) -> Result<(), ConnectionError>;

    /// Release the channel. Returns true only for the call that released it.
    fn close(&mut self) -> bool;
}

pub struct ConnectionManager {
    state: ConnectionState,
    events: UnboundedSender<SessionEvent>,
    /// Acquired by `open`, released by `close`
    outbound: Option<UnboundedSender<String>>,
    pump: Option<JoinHandle<()>>,
    released: bool,
}

impl ConnectionManager {
    pub fn new(events: UnboundedSender<SessionEvent>) -> Self {
        Self {
            state: ConnectionState::Closed,
            events,
            outbound: None,
            pump: None,
            released: false,
        }
    }

    /// Start connecting to `endpoint`
    ///
    /// Returns immediately. The outcome arrives on the event queue as
    /// `Connected` or `ConnectFailed`.
    pub fn open(&mut self, endpoint: &str) {
        if self.outbound.is_some() || self.released {
            tracing::warn!("Connection already opened, ignoring open({})", endpoint);
            return;
        }

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        self.outbound = Some(outbound_tx);
        self.state = ConnectionState::Connecting;

        tracing::info!("Connecting to inference stream at {}", endpoint);
        self.pump = Some(tokio::spawn(pump(
            endpoint.to_string(),
            outbound_rx,
            self.events.clone(),
        )));
    }
}

impl Channel for ConnectionManager {
    fn state(&self) -> ConnectionState {
        self.state
    }

    fn transition(&mut self, state: ConnectionState) {
        if self.released {
            return;
        }
        self.state = state;
    }

    fn send(&mut self, text: &str) -> Result<(), ConnectionError> {
        if self.state != ConnectionState::Open {
            return Err(ConnectionError::NotOpen(self.state));
        }
        let outbound = self.outbound.as_ref().ok_or(ConnectionError::PumpStopped)?;
        outbound
            .send(text.to_string())
            .map_err(|_| ConnectionError::PumpStopped)
    }

    fn close(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.released = true;
        let previous = std::mem::replace(&mut self.state, ConnectionState::Closed);

        // Dropping the sender makes an open pump send a close frame and exit
        self.outbound = None;
        if let Some(pump) = self.pump.take() {
            if previous == ConnectionState::Connecting {
                pump.abort();
            }
        }
        tracing::info!("Inference stream connection released");
        true
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.close();
    }
}

async fn pump(
    endpoint: String,
    mut outbound: UnboundedReceiver<String>,
    events: UnboundedSender<SessionEvent>,
) {
    let (socket, _) = match tokio_tungstenite::connect_async(endpoint.as_str()).await {
        Ok(connected) => connected,
        Err(e) => {
            tracing::warn!("Inference stream handshake failed: {}", e);
            let _ = events.send(SessionEvent::ConnectFailed(e.to_string()));
            return;
        }
    };

    if events.send(SessionEvent::Connected).is_err() {
        return;
    }
    let (mut write, mut read) = socket.split();

    loop {
        tokio::select! {
            queued = outbound.recv() => match queued {
                Some(text) => {
                    if let Err(e) = write.send(WsMessage::Text(text)).await {
                        tracing::warn!("Inference stream write failed: {}", e);
                        break;
                    }
                }
                None => {
                    let _ = write.send(WsMessage::Close(None)).await;
                    // Local close: the controller already knows
                    return;
                }
            },
            incoming = read.next() => match incoming {
                Some(Ok(WsMessage::Text(text))) => {
                    tracing::trace!("<- {:?}", text);
                    if events.send(SessionEvent::Fragment(text)).is_err() {
                        return;
                    }
                }
                Some(Ok(WsMessage::Close(_))) | None => {
                    tracing::info!("Inference stream closed by backend");
                    break;
                }
                Some(Err(e)) => {
                    tracing::warn!("Inference stream error: {}", e);
                    break;
                }
                Some(Ok(_)) => {}
            },
        }
    }

    let _ = events.send(SessionEvent::Disconnected);
}
