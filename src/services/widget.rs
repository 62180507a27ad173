//! Assistant widget
//!
//! The surface a presentation shell drives: input buffer, visibility toggle,
//! suggested questions and the live conversation. Visibility is purely visual
//! and never affects the conversation or pending replies.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{broadcast, watch};

use crate::config::AppConfig;
use crate::models::knowledge::KnowledgeBase;
use crate::models::message::Message;
use crate::observability::{AssistantMetrics, MetricsSnapshot};
use crate::services::conversation::ConversationStore;
use crate::services::input::InputBuffer;
use crate::services::matcher::{AnswerMatcher, create_answer_matcher};
use crate::services::reply::{ReplyScheduler, ScheduledReply};

pub struct AssistantWidget {
    name: String,
    status_line: String,
    store: Arc<ConversationStore>,
    scheduler: ReplyScheduler,
    input: InputBuffer,
    suggested_questions: Vec<String>,
    open: AtomicBool,
    metrics: Arc<AssistantMetrics>,
}

/// Builder for [`AssistantWidget`]; defaults mirror [`AppConfig::default`].
pub struct AssistantWidgetBuilder {
    name: String,
    status_line: String,
    greeting: String,
    fallback_answer: String,
    knowledge: KnowledgeBase,
    matcher: Option<Arc<dyn AnswerMatcher>>,
    suggested_questions: Vec<String>,
    reply_delay: Duration,
}

impl Default for AssistantWidgetBuilder {
    fn default() -> Self {
        let config = AppConfig::default();
        Self {
            name: config.assistant.name.clone(),
            status_line: config.assistant.status_line.clone(),
            greeting: config.assistant.greeting.clone(),
            fallback_answer: config.assistant.fallback_answer.clone(),
            knowledge: config.knowledge.knowledge_base(),
            matcher: None,
            suggested_questions: config.knowledge.suggested_questions,
            reply_delay: config.assistant.reply_delay(),
        }
    }
}

impl AssistantWidgetBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn status_line(mut self, status_line: impl Into<String>) -> Self {
        self.status_line = status_line.into();
        self
    }

    pub fn greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = greeting.into();
        self
    }

    pub fn fallback_answer(mut self, fallback: impl Into<String>) -> Self {
        self.fallback_answer = fallback.into();
        self
    }

    pub fn knowledge(mut self, knowledge: KnowledgeBase) -> Self {
        self.knowledge = knowledge;
        self
    }

    /// Replaces the knowledge base matcher entirely.
    pub fn matcher(mut self, matcher: Arc<dyn AnswerMatcher>) -> Self {
        self.matcher = Some(matcher);
        self
    }

    pub fn suggested_questions(mut self, questions: Vec<String>) -> Self {
        self.suggested_questions = questions;
        self
    }

    pub fn reply_delay(mut self, delay: Duration) -> Self {
        self.reply_delay = delay;
        self
    }

    pub fn build(self) -> AssistantWidget {
        let store = Arc::new(ConversationStore::new(self.greeting));
        let matcher = self
            .matcher
            .unwrap_or_else(|| create_answer_matcher(Arc::new(self.knowledge), self.fallback_answer));
        let input = InputBuffer::new();
        let metrics = Arc::new(AssistantMetrics::default());
        let scheduler = ReplyScheduler::new(
            store.clone(),
            matcher,
            input.clone(),
            self.reply_delay,
            metrics.clone(),
        );

        AssistantWidget {
            name: self.name,
            status_line: self.status_line,
            store,
            scheduler,
            input,
            suggested_questions: self.suggested_questions,
            open: AtomicBool::new(false),
            metrics,
        }
    }
}

impl AssistantWidget {
    pub fn builder() -> AssistantWidgetBuilder {
        AssistantWidgetBuilder::default()
    }

    /// Widget with the built-in SoftSell content and default timing.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let builder = Self::builder()
            .name(config.assistant.name.clone())
            .status_line(config.assistant.status_line.clone())
            .greeting(config.assistant.greeting.clone())
            .fallback_answer(config.assistant.fallback_answer.clone())
            .knowledge(config.knowledge.knowledge_base())
            .suggested_questions(config.knowledge.suggested_questions.clone())
            .reply_delay(config.assistant.reply_delay());
        tracing::info!(
            "Assistant widget configured with {} knowledge entries, reply delay {}ms",
            config.knowledge.entries.len(),
            config.assistant.reply_delay_ms
        );
        builder.build()
    }

    // ===== Inputs =====

    /// Submits `raw` directly. Blank text is ignored.
    pub fn submit(&self, raw: &str) -> Option<ScheduledReply> {
        self.scheduler.submit(raw)
    }

    /// Submits the current input buffer (Enter key or send button).
    pub fn send(&self) -> Option<ScheduledReply> {
        let text = self.input.get();
        self.scheduler.submit(&text)
    }

    pub fn set_input(&self, text: impl Into<String>) {
        self.input.set(text);
    }

    /// Fills the input buffer with `question` without submitting it.
    pub fn select_suggested_question(&self, question: &str) {
        self.input.set(question);
    }

    pub fn open(&self) {
        self.open.store(true, Ordering::SeqCst);
    }

    pub fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    /// Flips visibility and returns the new state.
    pub fn toggle(&self) -> bool {
        !self.open.fetch_xor(true, Ordering::SeqCst)
    }

    // ===== Outputs =====

    pub fn messages(&self) -> Vec<Message> {
        self.store.all()
    }

    pub fn conversation(&self) -> &ConversationStore {
        &self.store
    }

    pub fn subscribe_messages(&self) -> broadcast::Receiver<Message> {
        self.store.subscribe()
    }

    pub fn is_composing(&self) -> bool {
        self.scheduler.is_composing()
    }

    pub fn subscribe_composing(&self) -> watch::Receiver<bool> {
        self.scheduler.subscribe_composing()
    }

    pub fn input(&self) -> String {
        self.input.get()
    }

    /// Send affordance is disabled while the buffer is blank.
    pub fn can_send(&self) -> bool {
        !self.input.is_blank()
    }

    pub fn suggested_questions(&self) -> &[String] {
        &self.suggested_questions
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status_line(&self) -> &str {
        &self.status_line
    }

    pub fn reply_delay(&self) -> Duration {
        self.scheduler.delay()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn gather_metrics(&self) -> String {
        self.metrics.gather()
    }
}

impl Default for AssistantWidget {
    fn default() -> Self {
        Self::new()
    }
}
