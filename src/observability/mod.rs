//! 可观测性模块
//!
//! 提供进程内指标计数和结构化日志初始化。

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

// ===== Simple Metrics (atomics, no exporter) =====

/// 助手指标
#[derive(Debug, Default)]
pub struct AssistantMetrics {
    submissions_total: AtomicU64,
    blank_submissions_total: AtomicU64,
    replies_scheduled_total: AtomicU64,
    replies_delivered_total: AtomicU64,
    fallback_answers_total: AtomicU64,
}

/// 指标快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub submissions_total: u64,
    pub blank_submissions_total: u64,
    pub replies_scheduled_total: u64,
    pub replies_delivered_total: u64,
    pub fallback_answers_total: u64,
}

impl AssistantMetrics {
    /// 记录一次提交（含空白提交）
    pub fn record_submission(&self, blank: bool) {
        self.submissions_total.fetch_add(1, Ordering::SeqCst);
        if blank {
            self.blank_submissions_total.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// 记录一次已调度的回复
    pub fn record_scheduled(&self) {
        self.replies_scheduled_total.fetch_add(1, Ordering::SeqCst);
    }

    /// 记录一次已投递的回复
    pub fn record_delivered(&self, fallback: bool) {
        self.replies_delivered_total.fetch_add(1, Ordering::SeqCst);
        if fallback {
            self.fallback_answers_total.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            submissions_total: self.submissions_total.load(Ordering::SeqCst),
            blank_submissions_total: self.blank_submissions_total.load(Ordering::SeqCst),
            replies_scheduled_total: self.replies_scheduled_total.load(Ordering::SeqCst),
            replies_delivered_total: self.replies_delivered_total.load(Ordering::SeqCst),
            fallback_answers_total: self.fallback_answers_total.load(Ordering::SeqCst),
        }
    }

    /// 生成 Prometheus 文本格式指标
    pub fn gather(&self) -> String {
        let s = self.snapshot();
        format!(
            r#"# HELP assistant_submissions_total Submissions received, including blank ones
# TYPE assistant_submissions_total counter
assistant_submissions_total {}
# HELP assistant_blank_submissions_total Blank submissions ignored
# TYPE assistant_blank_submissions_total counter
assistant_blank_submissions_total {}
# HELP assistant_replies_scheduled_total Replies scheduled
# TYPE assistant_replies_scheduled_total counter
assistant_replies_scheduled_total {}
# HELP assistant_replies_delivered_total Replies delivered
# TYPE assistant_replies_delivered_total counter
assistant_replies_delivered_total {}
# HELP assistant_fallback_answers_total Replies answered with the fallback text
# TYPE assistant_fallback_answers_total counter
assistant_fallback_answers_total {}
"#,
            s.submissions_total,
            s.blank_submissions_total,
            s.replies_scheduled_total,
            s.replies_delivered_total,
            s.fallback_answers_total,
        )
    }
}

// ===== Structured Logging =====

/// 初始化结构化日志
///
/// `RUST_LOG` 优先于配置中的日志级别。重复初始化时返回错误而不是 panic。
pub fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr);

    if logging.structured {
        builder.json().try_init()
    } else {
        builder.try_init()
    }
}
