//! Reply lifecycle state machine.
//!
//! Pure transitions: `transition` never touches the clock, the store or the
//! input buffer. It only returns the effects the scheduler must apply.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::models::message::Message;
use crate::services::normalizer::is_blank;

/// A reply that has been scheduled but not yet delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReply {
    /// The user message this reply answers.
    pub for_user_message: Message,
    /// When the answer becomes due.
    pub due_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyState {
    Idle,
    UserMessagePosted { message: Message },
    Composing { pending: PendingReply },
    Delivered { for_user_message: Message },
}

impl ReplyState {
    pub fn name(&self) -> &'static str {
        match self {
            ReplyState::Idle => "idle",
            ReplyState::UserMessagePosted { .. } => "user_message_posted",
            ReplyState::Composing { .. } => "composing",
            ReplyState::Delivered { .. } => "delivered",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyEvent {
    /// The shell submitted `message`; blank text is ignored.
    Submit { message: Message },
    /// Enter the composing phase at `at`, due after `delay`.
    BeginComposing { at: DateTime<Utc>, delay: Duration },
    /// The reply delay expired.
    DelayElapsed,
    /// Return to idle after delivery.
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyEffect {
    AppendUserMessage(Message),
    ClearInput,
    SetComposing(bool),
    /// Sleep for the given delay, then feed `DelayElapsed`.
    Wait(Duration),
    /// Resolve `question` against the knowledge base and append the answer.
    AppendAnswer { question: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: ReplyState,
    pub effects: Vec<ReplyEffect>,
}

impl Transition {
    fn to(state: ReplyState, effects: Vec<ReplyEffect>) -> Self {
        Self { state, effects }
    }

    fn stay(state: ReplyState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }
}

/// Computes the next state and the side effects to apply.
///
/// Events that do not apply to the current state leave it unchanged and
/// produce no effects.
pub fn transition(state: ReplyState, event: ReplyEvent) -> Transition {
    match (state, event) {
        (ReplyState::Idle, ReplyEvent::Submit { message }) => {
            if is_blank(message.text()) {
                return Transition::stay(ReplyState::Idle);
            }
            Transition::to(
                ReplyState::UserMessagePosted {
                    message: message.clone(),
                },
                vec![ReplyEffect::AppendUserMessage(message), ReplyEffect::ClearInput],
            )
        }
        (ReplyState::UserMessagePosted { message }, ReplyEvent::BeginComposing { at, delay }) => {
            let due_at = chrono::Duration::from_std(delay)
                .ok()
                .and_then(|d| at.checked_add_signed(d))
                .unwrap_or(at);
            Transition::to(
                ReplyState::Composing {
                    pending: PendingReply {
                        for_user_message: message,
                        due_at,
                    },
                },
                vec![ReplyEffect::SetComposing(true), ReplyEffect::Wait(delay)],
            )
        }
        (ReplyState::Composing { pending }, ReplyEvent::DelayElapsed) => {
            let question = pending.for_user_message.text().to_string();
            Transition::to(
                ReplyState::Delivered {
                    for_user_message: pending.for_user_message,
                },
                vec![
                    ReplyEffect::AppendAnswer { question },
                    ReplyEffect::SetComposing(false),
                ],
            )
        }
        (ReplyState::Delivered { .. }, ReplyEvent::Reset) => Transition::stay(ReplyState::Idle),
        (state, event) => {
            tracing::warn!("Ignoring reply event {:?} in state {}", event, state.name());
            Transition::stay(state)
        }
    }
}
