//! 错误处理模块
//!
//! 定义应用程序的错误类型。回复投递路径本身不会失败，
//! 错误只出现在启动阶段（配置加载与校验）以及等待已被销毁的回复任务时。

use thiserror::Error;

use crate::config::loader::ConfigValidationError;

/// 应用程序错误类型
#[derive(Error, Debug)]
pub enum AppError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 参数验证错误
    #[error("参数验证失败: {0}")]
    Validation(String),

    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(String),

    /// 内部错误
    #[error("内部错误: {0}")]
    Internal(String),
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Io(e.to_string())
    }
}

impl From<figment::Error> for AppError {
    fn from(e: figment::Error) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<ConfigValidationError> for AppError {
    fn from(e: ConfigValidationError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::Internal(e.to_string())
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_conversion() {
        let err: AppError = ConfigValidationError::EmptyGreeting.into();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("参数验证失败"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "config.toml");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::Io(ref m) if m.contains("config.toml")));
    }
}
