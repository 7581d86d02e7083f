use std::sync::Arc;
use std::time::Duration;

use crate::infrastructure::EventBus;
use crate::modules::chat::{
    ChatModule, ChatSettings, GenerationParams, LLMProviderConfig, ModelRegistry, ProviderType,
};
use crate::modules::config::{AppConfig, ProviderEndpoint};
use crate::shared::AppResult;

/// 应用全局状态
///
/// 由 HTTP 层共享，线程和消息由 ChatModule 管理
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub chat: Arc<ChatModule>,
    pub events: Arc<EventBus>,
}

impl AppState {
    /// 根据配置组装全部依赖
    pub fn from_config(config: AppConfig) -> AppResult<Self> {
        let registry =
            ModelRegistry::with_default_routes(provider_configs(&config), generation_params(&config))?;
        let events = Arc::new(EventBus::new());

        let settings = ChatSettings {
            welcome_message: config.app.welcome_message(),
            system_prompt: config.app.system_prompt.clone(),
            context_length: config.llm.context_length as usize,
        };
        let chat = ChatModule::new(Arc::new(registry), events.clone(), settings);

        Ok(Self::new(config, chat, events))
    }

    pub fn new(config: AppConfig, chat: ChatModule, events: Arc<EventBus>) -> Self {
        Self {
            config: Arc::new(config),
            chat: Arc::new(chat),
            events,
        }
    }
}

fn endpoint_config(
    provider_type: ProviderType,
    endpoint: &ProviderEndpoint,
    config: &AppConfig,
) -> LLMProviderConfig {
    LLMProviderConfig::new(provider_type, endpoint.base_url.clone())
        .with_api_key(endpoint.api_key.clone())
        .with_timeout_secs(config.llm.request_timeout_secs)
        .with_retry(config.llm.retry)
}

/// 每个提供商的连接配置
pub fn provider_configs(config: &AppConfig) -> Vec<LLMProviderConfig> {
    let providers = &config.providers;
    vec![
        endpoint_config(ProviderType::OpenRouter, &providers.openrouter, config)
            .with_header("HTTP-Referer", config.app.referer.clone())
            .with_header("X-Title", config.app.name.clone()),
        endpoint_config(ProviderType::Claude, &providers.anthropic, config),
        endpoint_config(ProviderType::Gemini, &providers.gemini, config),
    ]
}

/// 单次模型调用的总时限覆盖全部重试和退避
pub fn generation_params(config: &AppConfig) -> GenerationParams {
    let llm = &config.llm;
    let attempts = llm.retry.max_retries.saturating_add(1);
    let per_attempt = Duration::from_secs(llm.request_timeout_secs);
    let backoff = Duration::from_millis(llm.retry.max_backoff_ms)
        .saturating_mul(llm.retry.max_retries);

    GenerationParams {
        temperature: llm.temperature,
        max_tokens: llm.max_tokens,
        timeout: per_attempt
            .saturating_mul(attempts)
            .saturating_add(backoff),
    }
}
