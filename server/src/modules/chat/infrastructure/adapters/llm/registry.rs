use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::modules::chat::domain::{ChatMessage, ModelResult, MISSING_API_KEY};
use crate::modules::chat::ports::{
    CompletionRequest, LLMError, LLMPort, LLMProviderConfig, ModelInfo, ModelInvoker,
    ProviderType, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE,
};

use super::{ClaudeAdapter, GeminiAdapter, OpenRouterAdapter};

/// 内置路由表：模型标识 → (提供商, 上游模型名)
pub const DEFAULT_ROUTES: &[(&str, ProviderType, &str)] = &[
    ("GPT-4", ProviderType::OpenRouter, "openai/gpt-3.5-turbo"),
    ("DeepSeek", ProviderType::OpenRouter, "deepseek/deepseek-chat"),
    (
        "Perplexity",
        ProviderType::OpenRouter,
        "perplexity/llama-3.1-sonar-small-128k-online",
    ),
    (
        "Mistral",
        ProviderType::OpenRouter,
        "mistralai/mistral-7b-instruct",
    ),
    ("Claude", ProviderType::Claude, "claude-3-5-sonnet-20241022"),
    ("Gemini", ProviderType::Gemini, "gemini-pro"),
];

/// 单个模型的路由
#[derive(Debug, Clone)]
pub struct ModelRoute {
    pub model_id: String,
    pub provider: ProviderType,
    pub upstream_model: String,
}

/// 生成参数，所有提供商共用
#[derive(Debug, Clone, Copy)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
    /// 单次调用的总时限（包括重试）
    pub timeout: Duration,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(30),
        }
    }
}

/// 模型注册表
///
/// 持有每个提供商的适配器实例和静态路由表。`invoke` 永远返回一条 `ModelResult`，
/// 适配器的任何失败都被转换为带 `error` 的结果。
pub struct ModelRegistry {
    adapters: HashMap<ProviderType, Arc<dyn LLMPort>>,
    routes: Vec<ModelRoute>,
    params: GenerationParams,
}

impl ModelRegistry {
    /// 创建空注册表
    pub fn new(params: GenerationParams) -> Self {
        Self {
            adapters: HashMap::new(),
            routes: Vec::new(),
            params,
        }
    }

    /// 根据提供商配置创建适配器，并加载内置路由表
    pub fn with_default_routes(
        configs: Vec<LLMProviderConfig>,
        params: GenerationParams,
    ) -> Result<Self, LLMError> {
        let mut registry = Self::new(params);
        for config in configs {
            let adapter = Self::create_adapter(config)?;
            registry.register_adapter(adapter);
        }
        for (model_id, provider, upstream) in DEFAULT_ROUTES {
            registry.add_route(*model_id, *provider, *upstream);
        }
        Ok(registry)
    }

    /// 根据配置创建适配器
    fn create_adapter(config: LLMProviderConfig) -> Result<Arc<dyn LLMPort>, LLMError> {
        let adapter: Arc<dyn LLMPort> = match config.provider_type {
            ProviderType::OpenRouter => Arc::new(OpenRouterAdapter::new(config)?),
            ProviderType::Claude => Arc::new(ClaudeAdapter::new(config)?),
            ProviderType::Gemini => Arc::new(GeminiAdapter::new(config)?),
        };
        Ok(adapter)
    }

    /// 注册适配器，同一提供商只保留最后一个
    pub fn register_adapter(&mut self, adapter: Arc<dyn LLMPort>) {
        self.adapters.insert(adapter.provider_type(), adapter);
    }

    /// 添加或替换路由
    pub fn add_route(
        &mut self,
        model_id: impl Into<String>,
        provider: ProviderType,
        upstream_model: impl Into<String>,
    ) {
        let route = ModelRoute {
            model_id: model_id.into(),
            provider,
            upstream_model: upstream_model.into(),
        };
        match self.routes.iter_mut().find(|r| r.model_id == route.model_id) {
            Some(existing) => *existing = route,
            None => self.routes.push(route),
        }
    }

    pub fn route(&self, model_id: &str) -> Option<&ModelRoute> {
        self.routes.iter().find(|r| r.model_id == model_id)
    }

    pub fn is_supported(&self, model_id: &str) -> bool {
        self.route(model_id)
            .is_some_and(|r| self.adapters.contains_key(&r.provider))
    }
}

#[async_trait]
impl ModelInvoker for ModelRegistry {
    /// 列出路由表中的模型
    fn list_models(&self) -> Vec<ModelInfo> {
        self.routes
            .iter()
            .map(|r| ModelInfo {
                id: r.model_id.clone(),
                provider: r.provider,
                upstream_model: r.upstream_model.clone(),
                configured: self
                    .adapters
                    .get(&r.provider)
                    .is_some_and(|a| a.is_configured()),
            })
            .collect()
    }

    /// 调用单个模型
    async fn invoke(&self, model_id: &str, conversation: &[ChatMessage]) -> ModelResult {
        let Some(route) = self.route(model_id) else {
            warn!(model = model_id, "Model not supported");
            return ModelResult::unsupported(model_id);
        };
        let Some(adapter) = self.adapters.get(&route.provider) else {
            warn!(model = model_id, provider = ?route.provider, "No adapter registered");
            return ModelResult::unsupported(model_id);
        };

        let request = CompletionRequest::new(conversation.to_vec(), route.upstream_model.clone())
            .with_temperature(self.params.temperature)
            .with_max_tokens(self.params.max_tokens);

        let provider = adapter.provider_id();
        debug!(model = model_id, provider, upstream = %route.upstream_model, "Invoking model");

        let outcome = match tokio::time::timeout(self.params.timeout, adapter.complete(request))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(LLMError::Timeout {
                after_secs: self.params.timeout.as_secs(),
            }),
        };

        match outcome {
            Ok(response) => ModelResult::success(model_id, response.content),
            Err(err @ LLMError::MissingApiKey { .. }) => {
                warn!(model = model_id, provider, kind = err.kind().as_str(), "{}", err);
                ModelResult::failure(model_id, err.to_string(), MISSING_API_KEY)
            }
            Err(err) => {
                error!(
                    model = model_id,
                    provider,
                    kind = err.kind().as_str(),
                    error = %err,
                    "Model invocation failed"
                );
                ModelResult::failure(
                    model_id,
                    format!(
                        "Error occurred while processing your request with {}",
                        model_id
                    ),
                    err.public_reason(),
                )
            }
        }
    }
}
