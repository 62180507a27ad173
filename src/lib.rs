//! SoftSell Assistant - 网站嵌入式问答助手核心
//!
//! 维护会话消息、用字面子串匹配固定知识库，并在固定延迟后投递模拟回复。

pub mod config;
pub mod error;
pub mod models;
pub mod observability;
pub mod services;

pub use error::{AppError, Result};
pub use models::{KnowledgeBase, KnowledgeEntry, Message, MessageOrigin};
pub use services::{AssistantWidget, ConversationStore, ReplyScheduler, ScheduledReply};
