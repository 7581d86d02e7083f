// Claude Adapter - Anthropic Claude Messages API
//
// 实现 Claude 的消息 API 适配器

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::base::{build_client, read_json, send_with_retry};
use crate::modules::chat::domain::{ChatMessage, MessageRole};
use crate::modules::chat::ports::{
    CompletionRequest, CompletionResponse, LLMError, LLMPort, LLMProviderConfig, ProviderType,
};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Claude API 请求
#[derive(Debug, Serialize)]
struct ClaudeRequest {
    model: String,
    system: String,
    messages: Vec<ClaudeMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ClaudeMessage {
    role: &'static str,
    content: String,
}

/// Claude API 响应
#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

/// Claude 适配器
pub struct ClaudeAdapter {
    config: LLMProviderConfig,
    client: Client,
}

impl ClaudeAdapter {
    pub fn new(config: LLMProviderConfig) -> Result<Self, LLMError> {
        let client = build_client(config.timeout_secs)?;
        Ok(Self { config, client })
    }

    /// Claude 不接受 messages 中的 system 角色，合并到顶层 system 字段
    fn split_system(messages: &[ChatMessage]) -> (String, Vec<ClaudeMessage>) {
        let system_parts: Vec<&str> = messages
            .iter()
            .filter(|m| m.role() == MessageRole::System)
            .map(|m| m.content())
            .collect();

        let system = if system_parts.is_empty() {
            DEFAULT_SYSTEM_PROMPT.to_string()
        } else {
            system_parts.join("\n\n")
        };

        let turns = messages
            .iter()
            .filter_map(|m| match m.role() {
                MessageRole::System => None,
                MessageRole::User => Some(ClaudeMessage {
                    role: "user",
                    content: m.content().to_string(),
                }),
                MessageRole::Assistant => Some(ClaudeMessage {
                    role: "assistant",
                    content: m.content().to_string(),
                }),
            })
            .collect();

        (system, turns)
    }
}

#[async_trait]
impl LLMPort for ClaudeAdapter {
    fn provider_id(&self) -> &str {
        &self.config.id
    }

    fn provider_type(&self) -> ProviderType {
        ProviderType::Claude
    }

    fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LLMError> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| LLMError::MissingApiKey {
                provider: ProviderType::Claude.display_name().to_string(),
            })?;

        let (system, messages) = Self::split_system(&request.messages);
        let body = ClaudeRequest {
            model: request.model.clone(),
            system,
            messages,
            max_tokens: request.max_tokens_or_default(),
            temperature: request.temperature_or_default(),
        };
        debug!(model = %body.model, messages = body.messages.len(), "Sending Claude request");

        let url = self.config.api_url("messages");
        let response = send_with_retry(&self.config, || {
            self.client
                .post(&url)
                .header("x-api-key", api_key.expose())
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&body)
        })
        .await?;

        let parsed: ClaudeResponse = read_json(response).await?;
        let content = parsed
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .ok_or_else(|| LLMError::InvalidResponse("No text content in response".to_string()))?;

        Ok(CompletionResponse { content })
    }
}
