use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::modules::chat::domain::{ChatMessage, ModelResult, MISSING_API_KEY};
use crate::shared::{ApiKey, RetryPolicy};

/// 默认生成长度
pub const DEFAULT_MAX_TOKENS: u32 = 500;
/// 默认温度
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// 失败分类
///
/// 对外统一表现为 `ModelResult.error`，仅在日志中区分
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// 凭据缺失
    Configuration,
    /// 网络/连接失败、超时
    Transport,
    /// 上游返回非 2xx
    Upstream,
    /// 2xx 但响应结构不符
    Contract,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Configuration => "configuration",
            FailureKind::Transport => "transport",
            FailureKind::Upstream => "upstream",
            FailureKind::Contract => "contract",
        }
    }
}

/// LLM 错误类型
#[derive(Debug, Error)]
pub enum LLMError {
    #[error("{provider} API key not configured")]
    MissingApiKey { provider: String },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timed out after {after_secs}s")]
    Timeout { after_secs: u64 },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Rate limit exceeded")]
    RateLimitError,

    #[error("Unexpected response format: {0}")]
    InvalidResponse(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl LLMError {
    pub fn kind(&self) -> FailureKind {
        match self {
            LLMError::MissingApiKey { .. } => FailureKind::Configuration,
            LLMError::NetworkError(_) | LLMError::Timeout { .. } | LLMError::Unknown(_) => {
                FailureKind::Transport
            }
            LLMError::ApiError { .. } | LLMError::RateLimitError => FailureKind::Upstream,
            LLMError::InvalidResponse(_) => FailureKind::Contract,
        }
    }

    /// 网络错误、超时、429 与 5xx 可以重试
    pub fn is_retryable(&self) -> bool {
        match self {
            LLMError::NetworkError(_) | LLMError::Timeout { .. } | LLMError::RateLimitError => true,
            LLMError::ApiError { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// 写入 `ModelResult.error` 的简短原因，不包含上游原始响应
    pub fn public_reason(&self) -> String {
        match self {
            LLMError::MissingApiKey { .. } => MISSING_API_KEY.to_string(),
            LLMError::NetworkError(_) => "Network error".to_string(),
            LLMError::Timeout { .. } => "Request timed out".to_string(),
            LLMError::ApiError { status, .. } => format!("HTTP error! status: {}", status),
            LLMError::RateLimitError => "HTTP error! status: 429".to_string(),
            LLMError::InvalidResponse(_) => "Unexpected response format".to_string(),
            LLMError::Unknown(_) => "Unknown error".to_string(),
        }
    }
}

/// LLM 提供商类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    /// OpenAI 兼容的聚合服务
    OpenRouter,
    /// Anthropic Messages API
    Claude,
    /// Google Generative Language API
    Gemini,
}

impl ProviderType {
    /// 面向用户的提供商名称
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderType::OpenRouter => "OpenRouter",
            ProviderType::Claude => "Anthropic",
            ProviderType::Gemini => "Gemini",
        }
    }
}

/// 模型信息
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    /// 对外暴露的模型标识（如 "GPT-4"）
    pub id: String,
    pub provider: ProviderType,
    /// 发送给上游的模型名
    pub upstream_model: String,
    /// 提供商凭据是否已配置
    pub configured: bool,
}

/// 补全请求
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// 统一格式的对话
    pub messages: Vec<ChatMessage>,
    /// 上游模型名
    pub model: String,
    /// 最大生成 token 数
    pub max_tokens: Option<u32>,
    /// 温度参数 (0.0 - 2.0)
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>, model: impl Into<String>) -> Self {
        Self {
            messages,
            model: model.into(),
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn max_tokens_or_default(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    pub fn temperature_or_default(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }
}

/// 补全响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
}

/// LLM 服务端口 - 核心抽象接口
///
/// 所有 LLM 提供商适配器都必须实现此 trait
#[async_trait]
pub trait LLMPort: Send + Sync {
    /// 提供商 ID，用于日志
    fn provider_id(&self) -> &str;

    /// 获取提供商类型
    fn provider_type(&self) -> ProviderType;

    /// 凭据是否已配置
    fn is_configured(&self) -> bool;

    /// 单次补全请求
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LLMError>;
}

/// 按模型标识调用的端口
///
/// 实现方负责路由与错误转换，`invoke` 不会失败
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// 调用单个模型，任何失败都体现在返回值的 `error` 字段
    async fn invoke(&self, model_id: &str, conversation: &[ChatMessage]) -> ModelResult;

    /// 可用模型列表
    fn list_models(&self) -> Vec<ModelInfo>;
}

/// LLM 提供商配置
#[derive(Debug, Clone)]
pub struct LLMProviderConfig {
    pub id: String,
    pub provider_type: ProviderType,
    pub base_url: String,
    pub api_key: Option<ApiKey>,
    /// 附加请求头（如 OpenRouter 的 HTTP-Referer / X-Title）
    pub extra_headers: Vec<(String, String)>,
    pub timeout_secs: u64,
    pub retry: RetryPolicy,
}

impl LLMProviderConfig {
    pub fn new(provider_type: ProviderType, base_url: impl Into<String>) -> Self {
        Self {
            id: provider_type.display_name().to_lowercase(),
            provider_type,
            base_url: base_url.into(),
            api_key: None,
            extra_headers: Vec::new(),
            timeout_secs: 30,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_api_key(mut self, api_key: Option<ApiKey>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// 拼接 API URL
    pub fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint)
    }
}
