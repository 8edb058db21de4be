//! Chat transcript
//!
//! Messages are kept in send order. Each submit opens an exchange: the user
//! message followed by an empty assistant reply that grows as fragments are
//! applied. Nothing is ever removed, and only an unfinished reply can change.

use std::fmt;

use uuid::Uuid;

use super::accumulator::{accumulate, FragmentOutcome};
use crate::types::{Message, Role};

/// Identity of one submit/reply pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExchangeId(Uuid);

impl ExchangeId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct Exchange {
    id: ExchangeId,
    reply_index: usize,
    finished: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    exchanges: Vec<Exchange>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Append the user message and its empty reply
    ///
    /// Returns the new exchange and the index of its reply.
    pub fn begin_exchange(&mut self, text: impl Into<String>) -> (ExchangeId, usize) {
        self.messages.push(Message::new(Role::User, text));
        self.messages.push(Message::placeholder());

        let id = ExchangeId::new();
        let reply_index = self.messages.len() - 1;
        self.exchanges.push(Exchange {
            id,
            reply_index,
            finished: false,
        });
        (id, reply_index)
    }

    fn exchange(&self, id: ExchangeId) -> Option<&Exchange> {
        self.exchanges.iter().rev().find(|e| e.id == id)
    }

    pub fn reply_index(&self, id: ExchangeId) -> Option<usize> {
        self.exchange(id).map(|e| e.reply_index)
    }

    pub fn reply(&self, id: ExchangeId) -> Option<&Message> {
        self.reply_index(id).and_then(|i| self.messages.get(i))
    }

    pub fn is_finished(&self, id: ExchangeId) -> bool {
        self.exchange(id).map(|e| e.finished).unwrap_or(true)
    }

    /// Freeze the reply of `id` without an end-of-stream
    ///
    /// Returns false when the exchange is unknown or already finished.
    pub fn finish(&mut self, id: ExchangeId) -> bool {
        match self.exchanges.iter_mut().rev().find(|e| e.id == id) {
            Some(exchange) if !exchange.finished => {
                exchange.finished = true;
                true
            }
            _ => false,
        }
    }

    /// Route one fragment to the reply of `id`
    ///
    /// Returns `None` when the exchange is unknown or already finished.
    pub fn apply_fragment(&mut self, id: ExchangeId, fragment: &str) -> Option<FragmentOutcome> {
        let exchange = self
            .exchanges
            .iter_mut()
            .rev()
            .find(|e| e.id == id && !e.finished)?;
        let reply = self.messages.get_mut(exchange.reply_index)?;

        let outcome = accumulate(&mut reply.content, fragment);
        if outcome == FragmentOutcome::Finished {
            exchange.finished = true;
        }
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::accumulator::END_OF_STREAM;

    #[test]
    fn test_begin_exchange_appends_pair() {
        let mut transcript = Transcript::new();
        let (id, reply_index) = transcript.begin_exchange("Hello");

        assert_eq!(transcript.len(), 2);
        assert_eq!(reply_index, 1);
        assert_eq!(transcript.messages()[0].role, Role::User);
        assert_eq!(transcript.messages()[0].content, "Hello");
        assert_eq!(transcript.reply(id).unwrap().role, Role::Assistant);
        assert!(transcript.reply(id).unwrap().content.is_empty());
        assert!(!transcript.is_finished(id));
    }

    #[test]
    fn test_fragments_grow_only_their_reply() {
        let mut transcript = Transcript::new();
        let (first, _) = transcript.begin_exchange("one");
        let (second, _) = transcript.begin_exchange("two");

        transcript.apply_fragment(first, "late");
        transcript.apply_fragment(second, "fresh");

        assert_eq!(transcript.reply(first).unwrap().content, "late");
        assert_eq!(transcript.reply(second).unwrap().content, "fresh");
        assert_eq!(transcript.messages()[2].content, "two");
    }

    #[test]
    fn test_finished_reply_is_frozen() {
        let mut transcript = Transcript::new();
        let (id, _) = transcript.begin_exchange("q");

        assert_eq!(transcript.apply_fragment(id, "a"), Some(FragmentOutcome::Appended));
        assert_eq!(
            transcript.apply_fragment(id, END_OF_STREAM),
            Some(FragmentOutcome::Finished)
        );
        assert!(transcript.is_finished(id));
        assert_eq!(transcript.apply_fragment(id, "more"), None);
        assert_eq!(transcript.reply(id).unwrap().content, "a");
    }

    #[test]
    fn test_finish_freezes_partial_reply() {
        let mut transcript = Transcript::new();
        let (id, _) = transcript.begin_exchange("q");
        transcript.apply_fragment(id, "partial");

        assert!(transcript.finish(id));
        assert!(!transcript.finish(id));
        assert!(transcript.is_finished(id));
        assert_eq!(transcript.apply_fragment(id, "late"), None);
        assert_eq!(transcript.reply(id).unwrap().content, "partial");
    }

    #[test]
    fn test_unknown_exchange_is_ignored() {
        let mut other = Transcript::new();
        let (foreign, _) = other.begin_exchange("elsewhere");

        let mut transcript = Transcript::new();
        transcript.begin_exchange("here");
        assert_eq!(transcript.apply_fragment(foreign, "x"), None);
        assert!(transcript.is_finished(foreign));
    }
}
