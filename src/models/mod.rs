//! 核心数据模型模块
//!
//! 定义对话消息与知识库条目。

pub mod knowledge;
pub mod message;

pub use knowledge::{KnowledgeBase, KnowledgeEntry};
pub use message::{Message, MessageOrigin};
