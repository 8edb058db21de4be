//! Reply watchdog
//!
//! A single-shot deadline armed per submit. When it fires it posts
//! [`SessionEvent::WatchdogExpired`] carrying the exchange it was armed for;
//! it never touches session state itself.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use super::transcript::ExchangeId;
use super::SessionEvent;

pub struct Watchdog {
    deadline: Duration,
    events: UnboundedSender<SessionEvent>,
    /// Acquired by `arm`, released by `cancel` or `expired`
    armed: Option<(ExchangeId, JoinHandle<()>)>,
}

impl Watchdog {
    pub fn new(deadline: Duration, events: UnboundedSender<SessionEvent>) -> Self {
        Self {
            deadline,
            events,
            armed: None,
        }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Start the deadline for `exchange`, replacing any previous one
    pub fn arm(&mut self, exchange: ExchangeId) {
        self.cancel();

        let events = self.events.clone();
        let deadline = self.deadline;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            // The session may already be gone
            let _ = events.send(SessionEvent::WatchdogExpired(exchange));
        });
        self.armed = Some((exchange, handle));
    }

    /// Stop the pending deadline. Returns whether one was armed.
    pub fn cancel(&mut self) -> bool {
        match self.armed.take() {
            Some((exchange, handle)) => {
                handle.abort();
                tracing::trace!("Watchdog for {} cancelled", exchange);
                true
            }
            None => false,
        }
    }

    /// Forget the deadline after its expiry has been handled
    ///
    /// Returns false when the expiry belongs to a deadline that was
    /// cancelled or replaced in the meantime.
    pub fn expired(&mut self, exchange: ExchangeId) -> bool {
        match &self.armed {
            Some((armed, _)) if *armed == exchange => {
                self.armed = None;
                true
            }
            _ => false,
        }
    }

    pub fn armed_for(&self) -> Option<ExchangeId> {
        self.armed.as_ref().map(|(exchange, _)| *exchange)
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.cancel();
    }
}
