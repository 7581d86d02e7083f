// Gemini Adapter - Google Generative Language API

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::base::{build_client, read_json, send_with_retry};
use crate::modules::chat::domain::{ChatMessage, MessageRole};
use crate::modules::chat::ports::{
    CompletionRequest, CompletionResponse, LLMError, LLMPort, LLMProviderConfig, ProviderType,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

/// Gemini 适配器
///
/// 密钥通过查询参数传递；system 消息被丢弃，assistant 映射为 model
pub struct GeminiAdapter {
    config: LLMProviderConfig,
    client: Client,
}

impl GeminiAdapter {
    pub fn new(config: LLMProviderConfig) -> Result<Self, LLMError> {
        let client = build_client(config.timeout_secs)?;
        Ok(Self { config, client })
    }

    fn to_contents(messages: &[ChatMessage]) -> Vec<GeminiContent> {
        messages
            .iter()
            .filter(|m| m.role() != MessageRole::System)
            .map(|m| GeminiContent {
                role: Some(
                    match m.role() {
                        MessageRole::Assistant => "model",
                        _ => "user",
                    }
                    .to_string(),
                ),
                parts: vec![GeminiPart {
                    text: Some(m.content().to_string()),
                }],
            })
            .collect()
    }
}

#[async_trait]
impl LLMPort for GeminiAdapter {
    fn provider_id(&self) -> &str {
        &self.config.id
    }

    fn provider_type(&self) -> ProviderType {
        ProviderType::Gemini
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
                provider: ProviderType::Gemini.display_name().to_string(),
            })?;

        let body = GeminiRequest {
            contents: Self::to_contents(&request.messages),
            generation_config: GenerationConfig {
                temperature: request.temperature_or_default(),
                max_output_tokens: request.max_tokens_or_default(),
            },
        };
        debug!(model = %request.model, contents = body.contents.len(), "Sending Gemini request");

        let url = self
            .config
            .api_url(&format!("models/{}:generateContent", request.model));
        let response = send_with_retry(&self.config, || {
            self.client
                .post(&url)
                .query(&[("key", api_key.expose())])
                .json(&body)
        })
        .await?;

        let parsed: GeminiResponse = read_json(response).await?;
        let content = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| LLMError::InvalidResponse("No candidates in response".to_string()))?;

        Ok(CompletionResponse { content })
    }
}
