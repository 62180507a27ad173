//! 服务模块

pub mod conversation;
pub mod input;
pub mod matcher;
pub mod normalizer;
pub mod reply;
pub mod widget;

pub use conversation::ConversationStore;
pub use input::InputBuffer;
pub use matcher::{Answer, AnswerMatcher, KnowledgeMatcher, create_answer_matcher, match_answer};
pub use normalizer::{is_blank, normalize};
pub use reply::{ComposingIndicator, PendingReply, ReplyScheduler, ReplyState, ScheduledReply};
pub use widget::{AssistantWidget, AssistantWidgetBuilder};
