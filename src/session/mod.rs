//! Streaming chat session
//!
//! One session per chat view. Everything that can change session state is an
//! event on a single queue: connection open/failure/close, inbound fragments,
//! watchdog expiry, user submits and teardown. The connection pump and the
//! watchdog only post events; the controller applies them one at a time.

pub mod accumulator;
pub mod bootstrap;
pub mod connection;
pub mod controller;
pub mod transcript;
pub mod watchdog;

use tokio::sync::mpsc::UnboundedSender;

use crate::types::Message;

pub use accumulator::{FragmentOutcome, END_OF_STREAM};
pub use bootstrap::{start_session, ChatSession, PresetBackend};
pub use connection::{Channel, ConnectionError, ConnectionManager, ConnectionState};
pub use controller::{RejectedSubmit, SessionController, SessionState};
pub use transcript::{ExchangeId, Transcript};
pub use watchdog::Watchdog;

/// Inputs of the session state machine
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Handshake completed
    Connected,
    /// Handshake failed; the session stays unusable
    ConnectFailed(String),
    /// The backend closed the stream or the transport broke after open
    Disconnected,
    /// One inbound text frame
    Fragment(String),
    WatchdogExpired(ExchangeId),
    Submit(String),
    Teardown,
}

/// What a front end needs to render the session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    Connected,
    /// Blocking notification, reported once
    ConnectionFailed(String),
    Disconnected,
    MessageAppended { index: usize, message: Message },
    ReplyExtended { index: usize, fragment: String },
    InputLocked,
    InputUnlocked,
    Closed,
}

/// Front-end side of the event queue
#[derive(Clone, Debug)]
pub struct SessionHandle {
    events: UnboundedSender<SessionEvent>,
}

impl SessionHandle {
    pub fn new(events: UnboundedSender<SessionEvent>) -> Self {
        Self { events }
    }

    /// Queue a submit. Returns false if the session is gone.
    pub fn submit(&self, text: impl Into<String>) -> bool {
        self.events.send(SessionEvent::Submit(text.into())).is_ok()
    }

    pub fn teardown(&self) {
        let _ = self.events.send(SessionEvent::Teardown);
    }
}
