use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::knowledge::{KnowledgeBase, KnowledgeEntry, default_entries, default_suggested_questions};

/// 默认回复延迟（毫秒）
pub const DEFAULT_REPLY_DELAY_MS: u64 = 1500;

/// 回复延迟上限（毫秒）
pub const MAX_REPLY_DELAY_MS: u64 = 60_000;

pub const DEFAULT_GREETING: &str = "👋 Hi there! I'm SoftSell's virtual assistant. How can I help you with selling your software licenses today?";

pub const DEFAULT_FALLBACK_ANSWER: &str = "I don't have specific information about that, but our team can help! Please fill out our contact form, and a license specialist will get back to you within 24 hours.";

/// 助手配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// 显示名称
    pub name: String,
    /// 名称下方的状态行
    pub status_line: String,
    /// 会话开场白
    pub greeting: String,
    /// 未命中时的兜底回答
    pub fallback_answer: String,
    /// 回复延迟（毫秒）
    pub reply_delay_ms: u64,
}

impl AssistantConfig {
    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: "SoftSell Assistant".into(),
            status_line: "Online | Ask me anything".into(),
            greeting: DEFAULT_GREETING.into(),
            fallback_answer: DEFAULT_FALLBACK_ANSWER.into(),
            reply_delay_ms: DEFAULT_REPLY_DELAY_MS,
        }
    }
}

/// 知识库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// 有序条目，顺序即匹配优先级
    pub entries: Vec<KnowledgeEntry>,
    /// 建议问题
    pub suggested_questions: Vec<String>,
}

impl KnowledgeConfig {
    pub fn knowledge_base(&self) -> KnowledgeBase {
        KnowledgeBase::new(self.entries.clone())
    }
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            entries: default_entries(),
            suggested_questions: default_suggested_questions(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: String,
    /// 结构化日志格式
    pub structured: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            structured: false,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 助手配置
    pub assistant: AssistantConfig,
    /// 知识库配置
    pub knowledge: KnowledgeConfig,
    /// 日志配置
    pub logging: LoggingConfig,
    /// 应用名称
    pub app_name: String,
    /// 环境
    pub environment: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::development()
    }
}

impl AppConfig {
    /// 创建开发环境配置
    pub fn development() -> Self {
        Self {
            assistant: AssistantConfig::default(),
            knowledge: KnowledgeConfig::default(),
            logging: LoggingConfig {
                level: "debug".into(),
                structured: false,
            },
            app_name: "softsell-assistant".into(),
            environment: "development".into(),
        }
    }

    /// 创建生产环境配置
    pub fn production() -> Self {
        let mut config = Self::development();
        config.environment = "production".into();
        config.logging.level = "info".into();
        config.logging.structured = true;
        config
    }
}
