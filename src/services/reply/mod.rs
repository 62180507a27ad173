//! Reply scheduler
//!
//! Drives the reply state machine for each submission: the user message is
//! appended synchronously, then a spawned task waits out the reply delay and
//! appends the matched answer. Replies are never cancelled and overlapping
//! submissions are scheduled independently.

mod indicator;
pub mod state;

pub use indicator::ComposingIndicator;
pub use state::{PendingReply, ReplyEffect, ReplyEvent, ReplyState, Transition, transition};

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::sync::watch;

use crate::error::Result;
use crate::models::message::Message;
use crate::observability::AssistantMetrics;
use crate::services::conversation::ConversationStore;
use crate::services::input::InputBuffer;
use crate::services::matcher::AnswerMatcher;

/// Handle to a reply that is composing.
///
/// Dropping the handle does not cancel the reply.
pub struct ScheduledReply {
    pending: PendingReply,
    handle: JoinHandle<Message>,
}

impl ScheduledReply {
    pub fn pending(&self) -> &PendingReply {
        &self.pending
    }

    pub fn user_message(&self) -> &Message {
        &self.pending.for_user_message
    }

    /// Waits for the assistant message that answers this submission.
    ///
    /// Only fails if the runtime shut down before the reply was delivered.
    pub async fn delivered(self) -> Result<Message> {
        Ok(self.handle.await?)
    }
}

/// Everything a delivery task needs, shared with the scheduler.
struct SchedulerContext {
    store: Arc<ConversationStore>,
    matcher: Arc<dyn AnswerMatcher>,
    input: InputBuffer,
    composing: ComposingIndicator,
    metrics: Arc<AssistantMetrics>,
}

impl SchedulerContext {
    /// Applies effects in order. Returns the appended answer, if any.
    /// `Wait` is left to the caller driving the cycle.
    fn apply(&self, effects: Vec<ReplyEffect>) -> Option<Message> {
        let mut answered = None;
        for effect in effects {
            match effect {
                ReplyEffect::AppendUserMessage(message) => {
                    self.store.append(message);
                }
                ReplyEffect::ClearInput => self.input.clear(),
                ReplyEffect::SetComposing(true) => self.composing.begin(),
                ReplyEffect::SetComposing(false) => self.composing.finish(),
                ReplyEffect::Wait(_) => {}
                ReplyEffect::AppendAnswer { question } => {
                    let answer = self.matcher.resolve(&question);
                    self.metrics.record_delivered(answer.is_fallback());
                    answered = Some(self.store.append(Message::assistant(answer.text)));
                }
            }
        }
        answered
    }
}

#[derive(Clone)]
pub struct ReplyScheduler {
    context: Arc<SchedulerContext>,
    delay: Duration,
}

impl ReplyScheduler {
    pub fn new(
        store: Arc<ConversationStore>,
        matcher: Arc<dyn AnswerMatcher>,
        input: InputBuffer,
        delay: Duration,
        metrics: Arc<AssistantMetrics>,
    ) -> Self {
        Self {
            context: Arc::new(SchedulerContext {
                store,
                matcher,
                input,
                composing: ComposingIndicator::new(),
                metrics,
            }),
            delay,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_composing(&self) -> bool {
        self.context.composing.is_composing()
    }

    /// Number of replies scheduled but not yet delivered.
    pub fn outstanding(&self) -> usize {
        self.context.composing.outstanding()
    }

    pub fn subscribe_composing(&self) -> watch::Receiver<bool> {
        self.context.composing.subscribe()
    }

    /// Posts `raw` as a user message and schedules the answer.
    ///
    /// Returns `None` without touching the store when `raw` is blank.
    /// Must be called from within a Tokio runtime.
    pub fn submit(&self, raw: &str) -> Option<ScheduledReply> {
        let message = Message::user(raw);
        let posted_at = message.sent_at();
        let step = transition(ReplyState::Idle, ReplyEvent::Submit { message });
        let blank = step.state == ReplyState::Idle;
        self.context.metrics.record_submission(blank);
        if blank {
            tracing::debug!("Ignoring blank submission");
            return None;
        }
        self.context.apply(step.effects);

        let step = transition(
            step.state,
            ReplyEvent::BeginComposing {
                at: posted_at,
                delay: self.delay,
            },
        );
        let ReplyState::Composing { pending } = &step.state else {
            unreachable!("a posted message always enters composing");
        };
        let pending = pending.clone();
        let delay = step
            .effects
            .iter()
            .find_map(|effect| match effect {
                ReplyEffect::Wait(delay) => Some(*delay),
                _ => None,
            })
            .unwrap_or(self.delay);
        self.context.apply(step.effects);
        self.context.metrics.record_scheduled();

        tracing::info!(
            "Scheduled reply for message {} due at {}",
            pending.for_user_message.id(),
            pending.due_at
        );

        let context = Arc::clone(&self.context);
        let composing = step.state;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let step = transition(composing, ReplyEvent::DelayElapsed);
            let answer = context.apply(step.effects);
            let _idle = transition(step.state, ReplyEvent::Reset);

            let Some(message) = answer else {
                unreachable!("delivery always appends an answer");
            };
            tracing::info!("Delivered reply {}", message.id());
            message
        });

        Some(ScheduledReply { pending, handle })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::knowledge::{KnowledgeBase, KnowledgeEntry};
    use crate::models::message::MessageOrigin;
    use crate::services::matcher::create_answer_matcher;

    const DELAY: Duration = Duration::from_millis(1500);

    fn scheduler(kb: KnowledgeBase) -> (ReplyScheduler, Arc<ConversationStore>, InputBuffer) {
        let store = Arc::new(ConversationStore::new("greeting"));
        let input = InputBuffer::new();
        let scheduler = ReplyScheduler::new(
            store.clone(),
            create_answer_matcher(Arc::new(kb), "fallback"),
            input.clone(),
            DELAY,
            Arc::new(AssistantMetrics::default()),
        );
        (scheduler, store, input)
    }

    #[tokio::test(start_paused = true)]
    async fn test_user_message_is_posted_immediately() {
        let (scheduler, store, input) = scheduler(KnowledgeBase::empty());
        input.set("pricing?");

        let reply = scheduler.submit("pricing?").unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.last().unwrap().origin(), MessageOrigin::User);
        assert_eq!(reply.user_message().text(), "pricing?");
        assert!(input.get().is_empty());
        assert!(scheduler.is_composing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_answer_arrives_after_delay() {
        let kb = KnowledgeBase::new(vec![KnowledgeEntry::new("pricing", "Valued per license.")]);
        let (scheduler, store, _) = scheduler(kb);

        let reply = scheduler.submit("Pricing").unwrap();

        tokio::time::sleep(DELAY - Duration::from_millis(1)).await;
        assert_eq!(store.len(), 2);
        assert!(scheduler.is_composing());

        let answer = reply.delivered().await.unwrap();
        assert_eq!(answer.text(), "Valued per license.");
        assert_eq!(answer.origin(), MessageOrigin::Assistant);
        assert_eq!(store.len(), 3);
        assert_eq!(store.last().unwrap(), answer);
        assert!(!scheduler.is_composing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_reply_due_time() {
        let (scheduler, _, _) = scheduler(KnowledgeBase::empty());
        let reply = scheduler.submit("hello").unwrap();
        let pending = reply.pending();
        assert_eq!(
            pending.due_at - pending.for_user_message.sent_at(),
            chrono::Duration::milliseconds(1500)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_submission_is_noop() {
        let (scheduler, store, input) = scheduler(KnowledgeBase::empty());
        input.set("   ");

        assert!(scheduler.submit("   ").is_none());
        assert!(scheduler.submit("").is_none());

        assert_eq!(store.len(), 1);
        assert_eq!(input.get(), "   ");
        assert!(!scheduler.is_composing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handle_still_delivers() {
        let (scheduler, store, _) = scheduler(KnowledgeBase::empty());
        drop(scheduler.submit("anyone there?"));

        tokio::time::sleep(DELAY + Duration::from_millis(1)).await;
        assert_eq!(store.len(), 3);
        assert_eq!(store.last().unwrap().text(), "fallback");
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_replies_keep_indicator_up() {
        let (scheduler, store, _) = scheduler(KnowledgeBase::empty());
        let mut composing = scheduler.subscribe_composing();

        let first = scheduler.submit("x").unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        let second = scheduler.submit("y").unwrap();
        assert_eq!(scheduler.outstanding(), 2);
        assert!(*composing.borrow_and_update());

        first.delivered().await.unwrap();
        assert!(scheduler.is_composing());
        assert_eq!(store.len(), 4);

        second.delivered().await.unwrap();
        assert!(!scheduler.is_composing());
        assert_eq!(store.len(), 5);
        assert!(composing.has_changed().unwrap());
        assert!(!*composing.borrow_and_update());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delivered_answer_equals_stored_message() {
        let store = Arc::new(ConversationStore::seeded(Message::new(
            "greeting from the future",
            MessageOrigin::Assistant,
            chrono::Utc::now() + chrono::Duration::hours(1),
        )));
        let scheduler = ReplyScheduler::new(
            store.clone(),
            create_answer_matcher(Arc::new(KnowledgeBase::empty()), "fallback"),
            InputBuffer::new(),
            DELAY,
            Arc::new(AssistantMetrics::default()),
        );

        let answer = scheduler.submit("hello").unwrap().delivered().await.unwrap();

        let messages = store.all();
        assert_eq!(answer.sent_at(), messages[0].sent_at());
        assert_eq!(messages.last().unwrap(), &answer);
    }
}
