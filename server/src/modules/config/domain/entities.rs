// Config Domain Entities
//
// 配置领域实体定义

use serde::{Deserialize, Serialize};

use super::value_objects::{PartialProviderEndpoint, ProviderEndpoint};
use crate::shared::RetryPolicy;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8787";
pub const DEFAULT_APP_NAME: &str = "VICKY KA AI";
pub const DEFAULT_APP_URL: &str = "https://vickykaai.com";
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// 单次调用允许的最大重试次数
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

/// 应用信息
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfoConfig {
    pub name: String,
    /// 作为 HTTP-Referer 发送给 OpenRouter
    pub referer: String,
    pub system_prompt: Option<String>,
    /// 覆盖默认欢迎语
    pub welcome_message: Option<String>,
}

impl Default for AppInfoConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_APP_NAME.to_string(),
            referer: DEFAULT_APP_URL.to_string(),
            system_prompt: None,
            welcome_message: None,
        }
    }
}

impl AppInfoConfig {
    /// 新线程的欢迎语
    pub fn welcome_message(&self) -> String {
        match &self.welcome_message {
            Some(message) => message.clone(),
            None => format!(
                "Welcome to {}! Ask me anything and I'll respond using multiple AI models simultaneously.",
                self.name
            ),
        }
    }
}

/// LLM 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LLMConfig {
    pub temperature: f32,
    pub max_tokens: u32,
    /// 进入上下文的历史消息上限
    pub context_length: u32,
    pub request_timeout_secs: u64,
    pub retry: RetryPolicy,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 500,
            context_length: 50,
            request_timeout_secs: 30,
            retry: RetryPolicy::default(),
        }
    }
}

/// 提供商配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvidersConfig {
    pub openrouter: ProviderEndpoint,
    pub anthropic: ProviderEndpoint,
    pub gemini: ProviderEndpoint,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            openrouter: ProviderEndpoint::new(DEFAULT_OPENROUTER_BASE_URL),
            anthropic: ProviderEndpoint::new(DEFAULT_ANTHROPIC_BASE_URL),
            gemini: ProviderEndpoint::new(DEFAULT_GEMINI_BASE_URL),
        }
    }
}

/// 应用配置聚合根
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub server: ServerConfig,
    pub app: AppInfoConfig,
    pub llm: LLMConfig,
    pub providers: ProvidersConfig,
}

impl AppConfig {
    /// 创建新的默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 合并部分配置更新
    pub fn merge(&mut self, partial: PartialAppConfig) {
        if let Some(bind_addr) = partial.server.bind_addr {
            self.server.bind_addr = bind_addr;
        }

        let app = partial.app;
        if let Some(name) = app.name {
            self.app.name = name;
        }
        if let Some(referer) = app.referer {
            self.app.referer = referer;
        }
        if let Some(prompt) = app.system_prompt {
            self.app.system_prompt = Some(prompt).filter(|p| !p.trim().is_empty());
        }
        if let Some(welcome) = app.welcome_message {
            self.app.welcome_message = Some(welcome).filter(|w| !w.trim().is_empty());
        }

        let llm = partial.llm;
        if let Some(temperature) = llm.temperature {
            self.llm.temperature = temperature;
        }
        if let Some(max_tokens) = llm.max_tokens {
            self.llm.max_tokens = max_tokens;
        }
        if let Some(context_length) = llm.context_length {
            self.llm.context_length = context_length;
        }
        if let Some(timeout) = llm.request_timeout_secs {
            self.llm.request_timeout_secs = timeout;
        }
        if let Some(max_retries) = llm.max_retries {
            self.llm.retry.max_retries = max_retries;
        }
        if let Some(initial) = llm.initial_backoff_ms {
            self.llm.retry.initial_backoff_ms = initial;
        }
        if let Some(max) = llm.max_backoff_ms {
            self.llm.retry.max_backoff_ms = max;
        }

        self.providers.openrouter.merge(partial.providers.openrouter);
        self.providers.anthropic.merge(partial.providers.anthropic);
        self.providers.gemini.merge(partial.providers.gemini);
    }

    /// 验证配置是否有效，返回全部问题
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.server.bind_addr.trim().is_empty() {
            errors.push("Bind address must not be empty".to_string());
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            errors.push("Temperature must be between 0 and 2".to_string());
        }
        if self.llm.max_tokens == 0 {
            errors.push("Max tokens must be greater than 0".to_string());
        }
        if self.llm.context_length == 0 || self.llm.context_length > 100 {
            errors.push("Context length must be between 1 and 100".to_string());
        }
        if self.llm.request_timeout_secs == 0 {
            errors.push("Request timeout must be greater than 0".to_string());
        }
        if self.llm.retry.max_retries > MAX_RETRIES_LIMIT {
            errors.push(format!("Max retries must not exceed {}", MAX_RETRIES_LIMIT));
        }
        if self.llm.retry.initial_backoff_ms > self.llm.retry.max_backoff_ms {
            errors.push("Initial backoff must not exceed max backoff".to_string());
        }

        for (name, endpoint) in [
            ("OpenRouter", &self.providers.openrouter),
            ("Anthropic", &self.providers.anthropic),
            ("Gemini", &self.providers.gemini),
        ] {
            if endpoint.base_url.trim().is_empty() {
                errors.push(format!("{} base URL must not be empty", name));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// 部分配置更新（用于合并）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialAppConfig {
    pub server: PartialServerConfig,
    pub app: PartialAppInfoConfig,
    pub llm: PartialLLMConfig,
    pub providers: PartialProvidersConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialServerConfig {
    pub bind_addr: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialAppInfoConfig {
    pub name: Option<String>,
    pub referer: Option<String>,
    pub system_prompt: Option<String>,
    pub welcome_message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialLLMConfig {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub context_length: Option<u32>,
    pub request_timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
    pub initial_backoff_ms: Option<u64>,
    pub max_backoff_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialProvidersConfig {
    pub openrouter: PartialProviderEndpoint,
    pub anthropic: PartialProviderEndpoint,
    pub gemini: PartialProviderEndpoint,
}
