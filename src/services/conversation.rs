//! Conversation store
//!
//! Append-only, ordered message log for a single widget session. Readers get
//! owned snapshots; `append` is the only mutator and nothing is ever removed.

use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::models::message::Message;

/// Capacity of the append notification channel. Slow subscribers lag rather
/// than block appends.
const EVENT_CHANNEL_CAPACITY: usize = 64;

pub struct ConversationStore {
    messages: RwLock<Vec<Message>>,
    events: broadcast::Sender<Message>,
}

impl ConversationStore {
    /// Creates a store seeded with a single assistant greeting.
    pub fn new(greeting: impl Into<String>) -> Self {
        Self::seeded(Message::assistant(greeting))
    }

    /// Creates a store whose first message is `seed`.
    pub fn seeded(seed: Message) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            messages: RwLock::new(vec![seed]),
            events,
        }
    }

    /// Appends a message, notifies subscribers and returns the stored copy.
    ///
    /// A timestamp earlier than the current last message is raised to it so the
    /// log stays chronological.
    pub fn append(&self, message: Message) -> Message {
        let message = {
            let mut messages = self.messages.write();
            let message = match messages.last() {
                Some(last) => message.clamp_sent_at(last.sent_at()),
                None => message,
            };
            messages.push(message.clone());
            message
        };

        tracing::debug!(
            "Appended {:?} message {} to conversation",
            message.origin(),
            message.id()
        );
        // 没有订阅者时发送会失败，忽略即可
        let _ = self.events.send(message.clone());
        message
    }

    /// Snapshot of every message, oldest first.
    pub fn all(&self) -> Vec<Message> {
        self.messages.read().clone()
    }

    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    /// Always false after construction, the greeting is never removed.
    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }

    pub fn last(&self) -> Option<Message> {
        self.messages.read().last().cloned()
    }

    /// Receives every message appended after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Message> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::MessageOrigin;
    use chrono::{Duration, Utc};

    #[test]
    fn test_store_starts_with_greeting() {
        let store = ConversationStore::new("hello");
        assert_eq!(store.len(), 1);
        assert!(!store.is_empty());
        let first = store.last().unwrap();
        assert_eq!(first.text(), "hello");
        assert_eq!(first.origin(), MessageOrigin::Assistant);
    }

    #[test]
    fn test_append_preserves_order() {
        let store = ConversationStore::new("hello");
        store.append(Message::user("one"));
        store.append(Message::assistant("two"));

        let texts: Vec<String> = store.all().iter().map(|m| m.text().to_string()).collect();
        assert_eq!(texts, vec!["hello", "one", "two"]);
    }

    #[test]
    fn test_all_is_idempotent_and_detached() {
        let store = ConversationStore::new("hello");
        store.append(Message::user("question"));

        let first = store.all();
        let second = store.all();
        assert_eq!(first, second);

        let mut snapshot = store.all();
        snapshot.clear();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_timestamps_never_go_backwards() {
        let store = ConversationStore::new("hello");
        let seed_time = store.last().unwrap().sent_at();
        let stored = store.append(Message::new(
            "from the past",
            MessageOrigin::User,
            seed_time - Duration::minutes(10),
        ));

        let messages = store.all();
        assert_eq!(messages[1].sent_at(), seed_time);
        assert_eq!(stored, messages[1]);
        assert!(messages.windows(2).all(|w| w[0].sent_at() <= w[1].sent_at()));
        assert!(messages[1].sent_at() <= Utc::now());
    }

    #[tokio::test]
    async fn test_subscribers_receive_appends() {
        let store = ConversationStore::new("hello");
        let mut receiver = store.subscribe();

        store.append(Message::user("ping"));

        let received = receiver.recv().await.unwrap();
        assert_eq!(received.text(), "ping");
        assert_eq!(received, store.last().unwrap());
    }
}
