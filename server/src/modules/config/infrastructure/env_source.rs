// Environment Config Source
//
// 从环境变量读取配置

use std::str::FromStr;

use tracing::debug;

use crate::modules::config::domain::{
    PartialAppConfig, PartialAppInfoConfig, PartialLLMConfig, PartialProviderEndpoint,
    PartialProvidersConfig, PartialServerConfig,
};
use crate::modules::config::ports::{ConfigError, ConfigSource};

type Lookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// 环境变量配置来源
///
/// 变量查找可以注入，测试无需修改进程环境
pub struct EnvConfigSource {
    lookup: Lookup,
}

impl EnvConfigSource {
    /// 读取进程环境变量
    pub fn from_env() -> Self {
        Self::with_lookup(|key| std::env::var(key).ok())
    }

    pub fn with_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            lookup: Box::new(lookup),
        }
    }

    /// 读取字符串，空白值视为未设置
    fn string(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// 读取密钥，空白值保留以便合并时清除
    fn secret(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
    }

    fn number<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.string(key) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<T>()
                .map(Some)
                .map_err(|e| ConfigError::invalid(key, e.to_string())),
        }
    }

    fn endpoint(&self, base_url_key: &str, api_key_key: &str) -> PartialProviderEndpoint {
        PartialProviderEndpoint {
            base_url: self.string(base_url_key),
            api_key: self.secret(api_key_key),
        }
    }
}

impl ConfigSource for EnvConfigSource {
    fn load(&self) -> Result<PartialAppConfig, ConfigError> {
        let partial = PartialAppConfig {
            server: PartialServerConfig {
                bind_addr: self.string("MULTICHAT_BIND_ADDR"),
            },
            app: PartialAppInfoConfig {
                name: self.string("MULTICHAT_APP_NAME"),
                referer: self.string("MULTICHAT_APP_URL"),
                system_prompt: self.string("MULTICHAT_SYSTEM_PROMPT"),
                welcome_message: self.string("MULTICHAT_WELCOME_MESSAGE"),
            },
            llm: PartialLLMConfig {
                temperature: self.number("MULTICHAT_TEMPERATURE")?,
                max_tokens: self.number("MULTICHAT_MAX_TOKENS")?,
                context_length: self.number("MULTICHAT_CONTEXT_LENGTH")?,
                request_timeout_secs: self.number("MULTICHAT_REQUEST_TIMEOUT_SECS")?,
                max_retries: self.number("MULTICHAT_MAX_RETRIES")?,
                initial_backoff_ms: self.number("MULTICHAT_INITIAL_BACKOFF_MS")?,
                max_backoff_ms: self.number("MULTICHAT_MAX_BACKOFF_MS")?,
            },
            providers: PartialProvidersConfig {
                openrouter: self.endpoint("OPENROUTER_BASE_URL", "OPENROUTER_API_KEY"),
                anthropic: self.endpoint("ANTHROPIC_BASE_URL", "ANTHROPIC_API_KEY"),
                gemini: self.endpoint("GEMINI_BASE_URL", "GEMINI_API_KEY"),
            },
        };

        debug!(
            openrouter = partial.providers.openrouter.api_key.is_some(),
            anthropic = partial.providers.anthropic.api_key.is_some(),
            gemini = partial.providers.gemini.api_key.is_some(),
            "Loaded configuration from environment"
        );

        Ok(partial)
    }
}
