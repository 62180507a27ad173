use crate::config::config::{AppConfig, MAX_REPLY_DELAY_MS};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// 配置文件路径环境变量
pub const CONFIG_PATH_ENV: &str = "SOFTSELL_CONFIG";

/// 环境变量前缀
const ENV_PREFIX: &str = "SOFTSELL_";

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 从默认路径加载配置
    ///
    /// 优先级（后者覆盖前者）：
    /// 1. 内置默认值
    /// 2. `SOFTSELL_CONFIG` 指定的文件，否则 ./config.toml
    /// 3. `SOFTSELL_` 前缀的环境变量（`__` 分隔嵌套字段）
    pub fn load() -> Result<AppConfig, figment::Error> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_config_path());
        Self::load_from(path)
    }

    /// 从指定路径加载配置，文件不存在时仅使用默认值和环境变量
    pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig, figment::Error> {
        Self::figment(path.as_ref()).extract()
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["CONFIG"]).split("__"))
    }

    /// 验证配置
    pub fn validate(config: &AppConfig) -> Result<(), ConfigValidationError> {
        if config.assistant.greeting.trim().is_empty() {
            return Err(ConfigValidationError::EmptyGreeting);
        }

        if config.assistant.fallback_answer.trim().is_empty() {
            return Err(ConfigValidationError::EmptyFallbackAnswer);
        }

        if config.assistant.reply_delay_ms > MAX_REPLY_DELAY_MS {
            return Err(ConfigValidationError::ReplyDelayTooLong(
                config.assistant.reply_delay_ms,
            ));
        }

        for (index, entry) in config.knowledge.entries.iter().enumerate() {
            if entry.key.is_empty() {
                return Err(ConfigValidationError::EmptyKnowledgeKey(index));
            }
            if entry.has_uppercase_key() {
                tracing::warn!(
                    "Knowledge key {:?} contains uppercase characters and can never match by forward containment",
                    entry.key
                );
            }
        }

        Ok(())
    }
}

/// 配置验证错误
#[derive(thiserror::Error, Debug)]
pub enum ConfigValidationError {
    #[error("开场白不能为空")]
    EmptyGreeting,

    #[error("兜底回答不能为空")]
    EmptyFallbackAnswer,

    #[error("回复延迟过长: {0}ms（上限 60000ms）")]
    ReplyDelayTooLong(u64),

    #[error("第 {0} 个知识条目的键为空")]
    EmptyKnowledgeKey(usize),
}

/// 获取默认配置文件路径
pub fn default_config_path() -> PathBuf {
    PathBuf::from("config.toml")
}

/// 检查配置文件是否存在
pub fn config_exists() -> bool {
    default_config_path().exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::knowledge::KnowledgeEntry;
    use figment::Jail;

    #[test]
    fn test_load_defaults_without_file() {
        Jail::expect_with(|_jail| {
            let config = ConfigLoader::load_from("missing.toml")?;
            assert_eq!(config.assistant.reply_delay_ms, 1500);
            assert_eq!(config.knowledge.entries.len(), 4);
            assert_eq!(config.assistant.name, "SoftSell Assistant");
            Ok(())
        });
    }

    #[test]
    fn test_file_and_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                    environment = "staging"

                    [assistant]
                    reply_delay_ms = 250

                    [[knowledge.entries]]
                    key = "pricing"
                    answer = "Every license is valued individually."
                "#,
            )?;
            jail.set_env("SOFTSELL_ASSISTANT__NAME", "Helper");

            let config = ConfigLoader::load()?;
            assert_eq!(config.environment, "staging");
            assert_eq!(config.assistant.reply_delay_ms, 250);
            assert_eq!(config.assistant.name, "Helper");
            assert_eq!(config.knowledge.entries.len(), 1);
            assert_eq!(config.knowledge.entries[0].key, "pricing");
            // 未覆盖的字段保持默认
            assert_eq!(config.knowledge.suggested_questions.len(), 4);
            Ok(())
        });
    }

    #[test]
    fn test_config_path_env() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "app_name = \"custom\"")?;
            jail.set_env(CONFIG_PATH_ENV, "custom.toml");

            let config = ConfigLoader::load()?;
            assert_eq!(config.app_name, "custom");
            Ok(())
        });
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        assert!(ConfigLoader::validate(&config).is_ok());

        config.assistant.fallback_answer = "  ".into();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigValidationError::EmptyFallbackAnswer)
        ));

        let mut config = AppConfig::default();
        config.assistant.reply_delay_ms = MAX_REPLY_DELAY_MS + 1;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigValidationError::ReplyDelayTooLong(_))
        ));

        let mut config = AppConfig::default();
        config.knowledge.entries.push(KnowledgeEntry::new("", "anything"));
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigValidationError::EmptyKnowledgeKey(4))
        ));
    }

    #[test]
    fn test_validate_keeps_uppercase_keys() {
        let mut config = AppConfig::default();
        config.knowledge.entries = vec![KnowledgeEntry::new("Pricing", "never reached")];
        assert!(ConfigLoader::validate(&config).is_ok());
    }
}
