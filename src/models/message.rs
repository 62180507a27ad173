use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 消息来源
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MessageOrigin {
    /// 用户消息
    User,
    /// 助手消息
    Assistant,
}

impl MessageOrigin {
    pub fn is_user(&self) -> bool {
        matches!(self, MessageOrigin::User)
    }
}

/// 对话消息
///
/// 创建后不可变。会话存储只追加，不修改也不删除。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// 消息唯一标识
    id: String,
    /// 原始文本
    text: String,
    /// 来源
    origin: MessageOrigin,
    /// 发送时间
    sent_at: DateTime<Utc>,
}

impl Message {
    /// 创建用户消息
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, MessageOrigin::User, Utc::now())
    }

    /// 创建助手消息
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(text, MessageOrigin::Assistant, Utc::now())
    }

    /// 以指定时间创建消息
    pub fn new(text: impl Into<String>, origin: MessageOrigin, sent_at: DateTime<Utc>) -> Self {
        Self {
            id: format!("msg_{}", Uuid::new_v4()),
            text: text.into(),
            origin,
            sent_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn origin(&self) -> MessageOrigin {
        self.origin
    }

    pub fn sent_at(&self) -> DateTime<Utc> {
        self.sent_at
    }

    pub fn is_user(&self) -> bool {
        self.origin.is_user()
    }

    /// 本地时间 `HH:MM`，用于气泡下方的时间戳
    pub fn display_time(&self) -> String {
        self.sent_at.with_timezone(&Local).format("%H:%M").to_string()
    }

    /// 仅存储层使用：把倒退的时间戳钳到前一条消息的时间
    pub(crate) fn clamp_sent_at(mut self, floor: DateTime<Utc>) -> Self {
        if self.sent_at < floor {
            self.sent_at = floor;
        }
        self
    }
}
