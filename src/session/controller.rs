//! Session controller
//!
//! State machine of one chat session:
//!
//! - `Idle --submit--> AwaitingResponse`
//! - `AwaitingResponse --fragment--> Receiving`
//! - `AwaitingResponse | Receiving --end of stream | watchdog--> Idle`
//! - `any --teardown--> Closed`
//!
//! Inbound fragments are routed to a single streaming exchange. A watchdog
//! expiry unlocks input but keeps routing to the expired exchange, so a late
//! tail still lands in its own reply. The next accepted submit finalizes the
//! expired reply and takes over routing; a backend that never sends
//! `__END__` cannot push later answers into an older reply.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::accumulator::FragmentOutcome;
use super::connection::{Channel, ConnectionManager, ConnectionState};
use super::transcript::{ExchangeId, Transcript};
use super::watchdog::Watchdog;
use super::{SessionEvent, SessionHandle, SessionUpdate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// Watchdog armed, placeholder created, nothing received yet
    AwaitingResponse,
    /// At least one fragment applied to the pending reply
    Receiving,
    Closed,
}

/// Why a submit was ignored
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectedSubmit {
    #[error("message is empty")]
    Empty,
    #[error("connection is not open ({0:?})")]
    NotConnected(ConnectionState),
    #[error("a reply is still pending")]
    ExchangePending,
    #[error("session is closed")]
    Closed,
}

pub struct SessionController<C: Channel = ConnectionManager> {
    transcript: Transcript,
    state: SessionState,
    connection: C,
    watchdog: Watchdog,
    /// Exchange holding the input lock, if any
    pending: Option<ExchangeId>,
    /// Exchange inbound fragments are routed to: the pending one, or an
    /// expired one until the next submit
    streaming: Option<ExchangeId>,
    updates: UnboundedSender<SessionUpdate>,
    failure_reported: bool,
}

impl SessionController<ConnectionManager> {
    /// Create a controller and start connecting to `endpoint`
    pub fn connect(
        endpoint: &str,
        watchdog_deadline: Duration,
        updates: UnboundedSender<SessionUpdate>,
    ) -> (Self, SessionHandle, UnboundedReceiver<SessionEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let mut connection = ConnectionManager::new(events_tx.clone());
        connection.open(endpoint);

        let controller =
            Self::with_channel(connection, watchdog_deadline, events_tx.clone(), updates);
        (controller, SessionHandle::new(events_tx), events_rx)
    }
}

impl<C: Channel> SessionController<C> {
    pub fn with_channel(
        connection: C,
        watchdog_deadline: Duration,
        events: UnboundedSender<SessionEvent>,
        updates: UnboundedSender<SessionUpdate>,
    ) -> Self {
        Self {
            transcript: Transcript::new(),
            state: SessionState::Idle,
            connection,
            watchdog: Watchdog::new(watchdog_deadline, events),
            pending: None,
            streaming: None,
            updates,
            failure_reported: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn awaiting_completion(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_exchange(&self) -> Option<ExchangeId> {
        self.pending
    }

    pub fn watchdog_armed(&self) -> bool {
        self.watchdog.armed_for().is_some()
    }

    fn emit(&self, update: SessionUpdate) {
        // A front end that stopped listening does not stop the session
        let _ = self.updates.send(update);
    }

    /// Apply one event. Returns false once the session is closed.
    pub fn handle(&mut self, event: SessionEvent) -> bool {
        if self.state == SessionState::Closed {
            return false;
        }

        match event {
            SessionEvent::Connected => self.connected(),
            SessionEvent::ConnectFailed(reason) => self.connect_failed(reason),
            SessionEvent::Disconnected => self.disconnected(),
            SessionEvent::Fragment(fragment) => self.receive(&fragment),
            SessionEvent::WatchdogExpired(exchange) => self.watchdog_expired(exchange),
            SessionEvent::Submit(text) => {
                if let Err(reason) = self.submit(&text) {
                    tracing::debug!("Submit ignored: {}", reason);
                }
            }
            SessionEvent::Teardown => {
                self.teardown();
            }
        }

        self.state != SessionState::Closed
    }

    fn connected(&mut self) {
        self.connection.transition(ConnectionState::Open);
        tracing::info!("Inference stream open");
        self.emit(SessionUpdate::Connected);
        self.emit(SessionUpdate::InputUnlocked);
    }

    fn connect_failed(&mut self, reason: String) {
        self.connection.transition(ConnectionState::Errored);
        tracing::error!("Inference stream connection failed: {}", reason);
        if !self.failure_reported {
            self.failure_reported = true;
            self.emit(SessionUpdate::ConnectionFailed(reason));
        }
    }

    fn disconnected(&mut self) {
        self.connection.transition(ConnectionState::Closed);
        self.watchdog.cancel();
        self.streaming = None;
        self.state = SessionState::Idle;
        if self.pending.take().is_some() {
            self.emit(SessionUpdate::InputUnlocked);
        }
        self.emit(SessionUpdate::Disconnected);
    }

    /// Start an exchange: append the user message and an empty reply, send
    /// the text and arm the watchdog
    pub fn submit(&mut self, text: &str) -> Result<ExchangeId, RejectedSubmit> {
        if self.state == SessionState::Closed {
            return Err(RejectedSubmit::Closed);
        }

        let text = text.trim();
        if text.is_empty() {
            return Err(RejectedSubmit::Empty);
        }

        let connection_state = self.connection.state();
        if connection_state != ConnectionState::Open {
            return Err(RejectedSubmit::NotConnected(connection_state));
        }

        if self.pending.is_some() {
            return Err(RejectedSubmit::ExchangePending);
        }

        // Queued before the transcript changes, so a dead pump leaves no trace
        self.connection.send(text).map_err(|e| {
            tracing::warn!("Failed to send message: {}", e);
            RejectedSubmit::NotConnected(self.connection.state())
        })?;

        if let Some(expired) = self.streaming.take() {
            self.transcript.finish(expired);
            tracing::debug!("Finalized expired exchange {}", expired);
        }

        let (exchange, reply_index) = self.transcript.begin_exchange(text);
        for index in [reply_index - 1, reply_index] {
            if let Some(message) = self.transcript.messages().get(index) {
                self.emit(SessionUpdate::MessageAppended {
                    index,
                    message: message.clone(),
                });
            }
        }

        self.pending = Some(exchange);
        self.streaming = Some(exchange);
        self.watchdog.arm(exchange);
        self.state = SessionState::AwaitingResponse;
        self.emit(SessionUpdate::InputLocked);

        tracing::debug!("Exchange {} started", exchange);
        Ok(exchange)
    }

    /// Route one inbound fragment to the streaming reply
    pub fn receive(&mut self, fragment: &str) {
        let Some(exchange) = self.streaming else {
            tracing::debug!("Dropping fragment with no reply streaming: {:?}", fragment);
            return;
        };
        let Some(index) = self.transcript.reply_index(exchange) else {
            self.streaming = None;
            return;
        };

        let is_pending = self.pending == Some(exchange);
        match self.transcript.apply_fragment(exchange, fragment) {
            Some(FragmentOutcome::Finished) => {
                self.streaming = None;
                if is_pending {
                    self.finish_pending();
                } else {
                    tracing::debug!("Late end of stream for expired exchange {}", exchange);
                }
            }
            Some(outcome) => {
                if outcome == FragmentOutcome::Appended && !fragment.is_empty() {
                    self.emit(SessionUpdate::ReplyExtended {
                        index,
                        fragment: fragment.to_string(),
                    });
                } else if outcome == FragmentOutcome::Duplicate {
                    tracing::debug!("Dropped duplicate fragment {:?}", fragment);
                }
                if is_pending && self.state == SessionState::AwaitingResponse {
                    self.state = SessionState::Receiving;
                }
            }
            None => {
                self.streaming = None;
            }
        }
    }

    fn finish_pending(&mut self) {
        self.pending = None;
        self.watchdog.cancel();
        self.state = SessionState::Idle;
        self.emit(SessionUpdate::InputUnlocked);
    }

    /// Unlock input for an exchange that never reported its end
    ///
    /// The partial reply is left as is and the connection stays open. Late
    /// fragments keep extending it until the next submit.
    pub fn watchdog_expired(&mut self, exchange: ExchangeId) {
        if !self.watchdog.expired(exchange) || self.pending != Some(exchange) {
            tracing::trace!("Ignoring stale watchdog expiry for {}", exchange);
            return;
        }

        tracing::info!(
            "No end of stream within {:?}, unlocking input",
            self.watchdog.deadline()
        );
        self.pending = None;
        self.state = SessionState::Idle;
        self.emit(SessionUpdate::InputUnlocked);
    }

    /// Close the channel and cancel the watchdog. Safe to call repeatedly.
    ///
    /// Returns true only for the call that actually closed the session.
    pub fn teardown(&mut self) -> bool {
        if self.state == SessionState::Closed {
            return false;
        }
        self.state = SessionState::Closed;

        self.watchdog.cancel();
        self.connection.close();
        self.pending = None;
        self.streaming = None;

        tracing::info!("Session closed with {} messages", self.transcript.len());
        self.emit(SessionUpdate::Closed);
        true
    }

    /// Drive the session from its event queue until teardown
    pub async fn run(mut self, mut events: UnboundedReceiver<SessionEvent>) -> Transcript {
        while let Some(event) = events.recv().await {
            if !self.handle(event) {
                break;
            }
        }
        self.teardown();
        std::mem::take(&mut self.transcript)
    }
}

impl<C: Channel> Drop for SessionController<C> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::accumulator::END_OF_STREAM;
    use crate::types::Role;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Wire {
        sent: Vec<String>,
        releases: usize,
    }

    struct FakeChannel {
        state: ConnectionState,
        wire: Arc<Mutex<Wire>>,
    }

    impl Channel for FakeChannel {
        fn state(&self) -> ConnectionState {
            self.state
        }

        fn transition(&mut self, state: ConnectionState) {
            self.state = state;
        }

        fn send(&mut self, text: &str) -> Result<(), crate::session::ConnectionError> {
            if self.state != ConnectionState::Open {
                return Err(crate::session::ConnectionError::NotOpen(self.state));
            }
            self.wire.lock().unwrap().sent.push(text.to_string());
            Ok(())
        }

        fn close(&mut self) -> bool {
            if self.state == ConnectionState::Closed {
                return false;
            }
            self.state = ConnectionState::Closed;
            self.wire.lock().unwrap().releases += 1;
            true
        }
    }

    struct Harness {
        controller: SessionController<FakeChannel>,
        wire: Arc<Mutex<Wire>>,
        events: UnboundedReceiver<SessionEvent>,
        updates: UnboundedReceiver<SessionUpdate>,
    }

    impl Harness {
        fn new() -> Self {
            let wire = Arc::new(Mutex::new(Wire::default()));
            let channel = FakeChannel {
                state: ConnectionState::Connecting,
                wire: wire.clone(),
            };
            let (events_tx, events) = mpsc::unbounded_channel();
            let (updates_tx, updates) = mpsc::unbounded_channel();
            let mut controller = SessionController::with_channel(
                channel,
                Duration::from_millis(10_000),
                events_tx,
                updates_tx,
            );
            controller.handle(SessionEvent::Connected);
            Self {
                controller,
                wire,
                events,
                updates,
            }
        }

        fn feed(&mut self, fragments: &[&str]) {
            for fragment in fragments {
                self.controller
                    .handle(SessionEvent::Fragment(fragment.to_string()));
            }
        }

        fn sent(&self) -> Vec<String> {
            self.wire.lock().unwrap().sent.clone()
        }

        fn reply(&self, exchange: ExchangeId) -> String {
            self.controller
                .transcript()
                .reply(exchange)
                .map(|m| m.content.clone())
                .unwrap_or_default()
        }

        fn drain_updates(&mut self) -> Vec<SessionUpdate> {
            let mut drained = Vec::new();
            while let Ok(update) = self.updates.try_recv() {
                drained.push(update);
            }
            drained
        }

        /// Wait for the watchdog and hand its event to the controller
        async fn deliver_watchdog(&mut self) {
            let event = self.events.recv().await.expect("event queue closed");
            assert!(matches!(event, SessionEvent::WatchdogExpired(_)));
            self.controller.handle(event);
        }
    }

    #[tokio::test]
    async fn test_reassembles_reply_and_finishes() {
        let mut h = Harness::new();
        let exchange = h.controller.submit("Hello").unwrap();

        assert_eq!(h.controller.state(), SessionState::AwaitingResponse);
        assert!(h.controller.awaiting_completion());
        assert_eq!(h.sent(), vec!["Hello".to_string()]);

        h.feed(&["Hi", " there"]);
        assert_eq!(h.controller.state(), SessionState::Receiving);

        h.feed(&["there", "!", END_OF_STREAM]);
        assert_eq!(h.reply(exchange), "Hi there!");
        assert_eq!(h.controller.state(), SessionState::Idle);
        assert!(!h.controller.awaiting_completion());
        assert!(!h.controller.watchdog_armed());

        let roles: Vec<Role> = h
            .controller
            .transcript()
            .messages()
            .iter()
            .map(|m| m.role)
            .collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
    }

    #[tokio::test]
    async fn test_updates_describe_the_exchange() {
        let mut h = Harness::new();
        assert_eq!(
            h.drain_updates(),
            vec![SessionUpdate::Connected, SessionUpdate::InputUnlocked]
        );

        h.controller.submit("  Hello  ").unwrap();
        h.feed(&["Hi", "Hi", END_OF_STREAM]);

        let updates = h.drain_updates();
        assert!(matches!(
            &updates[0],
            SessionUpdate::MessageAppended { index: 0, message } if message.content == "Hello"
        ));
        assert!(matches!(
            &updates[1],
            SessionUpdate::MessageAppended { index: 1, message } if message.content.is_empty()
        ));
        assert_eq!(updates[2], SessionUpdate::InputLocked);
        assert_eq!(
            updates[3],
            SessionUpdate::ReplyExtended {
                index: 1,
                fragment: "Hi".into()
            }
        );
        assert_eq!(updates[4], SessionUpdate::InputUnlocked);
        assert_eq!(updates.len(), 5);
    }

    #[tokio::test]
    async fn test_repeated_sentinel_is_a_no_op() {
        let mut h = Harness::new();
        let exchange = h.controller.submit("q").unwrap();
        h.feed(&["a", END_OF_STREAM]);
        h.drain_updates();

        h.feed(&[END_OF_STREAM, END_OF_STREAM]);
        assert_eq!(h.reply(exchange), "a");
        assert_eq!(h.controller.state(), SessionState::Idle);
        assert!(h.drain_updates().is_empty());
    }

    #[tokio::test]
    async fn test_submit_rejected_while_pending() {
        let mut h = Harness::new();
        h.controller.submit("first").unwrap();

        assert_eq!(
            h.controller.submit("second"),
            Err(RejectedSubmit::ExchangePending)
        );
        assert_eq!(h.controller.transcript().len(), 2);
        assert_eq!(h.sent(), vec!["first".to_string()]);
    }

    #[tokio::test]
    async fn test_submit_rejects_blank_text() {
        let mut h = Harness::new();
        assert_eq!(h.controller.submit(""), Err(RejectedSubmit::Empty));
        assert_eq!(h.controller.submit(" \n\t"), Err(RejectedSubmit::Empty));
        assert!(h.controller.transcript().is_empty());
        assert!(h.sent().is_empty());
    }

    #[tokio::test]
    async fn test_submit_requires_open_connection() {
        let wire = Arc::new(Mutex::new(Wire::default()));
        let (events_tx, _events) = mpsc::unbounded_channel();
        let (updates_tx, _updates) = mpsc::unbounded_channel();
        let mut controller = SessionController::with_channel(
            FakeChannel {
                state: ConnectionState::Connecting,
                wire: wire.clone(),
            },
            Duration::from_secs(10),
            events_tx,
            updates_tx,
        );

        assert_eq!(
            controller.submit("hi"),
            Err(RejectedSubmit::NotConnected(ConnectionState::Connecting))
        );
        assert!(controller.transcript().is_empty());
        assert!(wire.lock().unwrap().sent.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_unlocks_without_touching_reply() {
        let mut h = Harness::new();
        let exchange = h.controller.submit("slow").unwrap();
        h.feed(&["partial"]);

        h.deliver_watchdog().await;

        assert_eq!(h.controller.state(), SessionState::Idle);
        assert!(!h.controller.awaiting_completion());
        assert_eq!(h.controller.connection_state(), ConnectionState::Open);
        assert_eq!(h.reply(exchange), "partial");

        assert!(h.controller.submit("again").is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_fragments_stay_with_expired_exchange() {
        let mut h = Harness::new();
        let first = h.controller.submit("first").unwrap();
        h.feed(&["par"]);
        h.deliver_watchdog().await;

        h.feed(&["tial", END_OF_STREAM]);
        assert_eq!(h.reply(first), "partial");
        assert!(h.controller.transcript().is_finished(first));
        assert_eq!(h.controller.state(), SessionState::Idle);

        let second = h.controller.submit("second").unwrap();
        h.feed(&["fresh", END_OF_STREAM]);
        assert_eq!(h.reply(second), "fresh");
        assert!(!h.controller.awaiting_completion());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unterminated_reply_does_not_capture_next_exchange() {
        let mut h = Harness::new();
        let first = h.controller.submit("first").unwrap();
        h.feed(&["Model/tokenizer not initialized."]);
        h.deliver_watchdog().await;

        let second = h.controller.submit("second").unwrap();
        assert!(h.controller.transcript().is_finished(first));
        h.feed(&["fresh answer", END_OF_STREAM]);

        assert_eq!(h.reply(first), "Model/tokenizer not initialized.");
        assert_eq!(h.reply(second), "fresh answer");
        assert!(!h.controller.awaiting_completion());
        assert_eq!(h.controller.state(), SessionState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_unterminated_reply_is_not_deduped() {
        let mut h = Harness::new();
        let first = h.controller.submit("first").unwrap();
        h.feed(&["Model/tokenizer not initialized."]);
        h.deliver_watchdog().await;

        let second = h.controller.submit("second").unwrap();
        h.feed(&["Model/tokenizer not initialized."]);
        h.deliver_watchdog().await;

        assert_eq!(h.reply(first), "Model/tokenizer not initialized.");
        assert_eq!(h.reply(second), "Model/tokenizer not initialized.");
        assert!(h.controller.submit("third").is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sentinel_cancels_watchdog() {
        let mut h = Harness::new();
        h.controller.submit("q").unwrap();
        h.feed(&[END_OF_STREAM]);
        assert!(!h.controller.watchdog_armed());

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(h.events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_fragments_without_exchange_are_dropped() {
        let mut h = Harness::new();
        h.feed(&["stray", END_OF_STREAM]);
        assert!(h.controller.transcript().is_empty());
        assert_eq!(h.controller.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_teardown_releases_once() {
        let mut h = Harness::new();
        h.controller.submit("q").unwrap();

        assert!(h.controller.teardown());
        assert!(!h.controller.teardown());
        assert!(!h.controller.handle(SessionEvent::Teardown));
        drop(h.controller);

        assert_eq!(h.wire.lock().unwrap().releases, 1);
    }

    #[tokio::test]
    async fn test_no_transitions_after_teardown() {
        let mut h = Harness::new();
        let exchange = h.controller.submit("q").unwrap();
        h.controller.teardown();

        h.feed(&["late"]);
        assert_eq!(h.reply(exchange), "");
        assert_eq!(h.controller.submit("again"), Err(RejectedSubmit::Closed));
        assert_eq!(h.controller.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn test_connection_failure_reported_once() {
        let wire = Arc::new(Mutex::new(Wire::default()));
        let (events_tx, _events) = mpsc::unbounded_channel();
        let (updates_tx, mut updates) = mpsc::unbounded_channel();
        let mut controller = SessionController::with_channel(
            FakeChannel {
                state: ConnectionState::Connecting,
                wire,
            },
            Duration::from_secs(10),
            events_tx,
            updates_tx,
        );

        controller.handle(SessionEvent::ConnectFailed("refused".into()));
        controller.handle(SessionEvent::ConnectFailed("refused".into()));

        assert_eq!(controller.connection_state(), ConnectionState::Errored);
        assert_eq!(
            updates.try_recv().unwrap(),
            SessionUpdate::ConnectionFailed("refused".into())
        );
        assert!(updates.try_recv().is_err());
        assert!(matches!(
            controller.submit("hi"),
            Err(RejectedSubmit::NotConnected(ConnectionState::Errored))
        ));
    }

    #[tokio::test]
    async fn test_disconnect_unlocks_input() {
        let mut h = Harness::new();
        h.controller.submit("q").unwrap();
        h.drain_updates();

        h.controller.handle(SessionEvent::Disconnected);
        assert!(!h.controller.awaiting_completion());
        assert!(!h.controller.watchdog_armed());
        assert_eq!(h.controller.connection_state(), ConnectionState::Closed);
        assert_eq!(
            h.drain_updates(),
            vec![SessionUpdate::InputUnlocked, SessionUpdate::Disconnected]
        );
    }

    #[tokio::test]
    async fn test_whitespace_fragment_kept_in_session() {
        let mut h = Harness::new();
        let exchange = h.controller.submit("q").unwrap();
        h.feed(&["a ", " ", "b", END_OF_STREAM]);
        assert_eq!(h.reply(exchange), "a  b");
    }
}
