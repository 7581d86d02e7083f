use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::base::{apply_extra_headers, build_client, read_json, send_with_retry};
use crate::modules::chat::ports::{
    CompletionRequest, CompletionResponse, LLMError, LLMPort, LLMProviderConfig, ProviderType,
};

/// OpenRouter 适配器
///
/// OpenAI 兼容的 chat/completions 接口，多个逻辑模型共用同一个实例
pub struct OpenRouterAdapter {
    client: Client,
    config: LLMProviderConfig,
}

impl OpenRouterAdapter {
    pub fn new(config: LLMProviderConfig) -> Result<Self, LLMError> {
        let client = build_client(config.timeout_secs)?;
        Ok(Self { client, config })
    }

    /// 转换为 OpenAI 请求格式
    fn to_openai_request(&self, request: &CompletionRequest) -> OpenAIRequest {
        OpenAIRequest {
            model: request.model.clone(),
            messages: request
                .messages
                .iter()
                .map(|m| OpenAIMessage {
                    role: m.role().as_str().to_string(),
                    content: Some(m.content().to_string()),
                })
                .collect(),
            temperature: request.temperature_or_default(),
            max_tokens: request.max_tokens_or_default(),
            stream: false,
        }
    }
}

#[async_trait]
impl LLMPort for OpenRouterAdapter {
    fn provider_id(&self) -> &str {
        &self.config.id
    }

    fn provider_type(&self) -> ProviderType {
        ProviderType::OpenRouter
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
                provider: ProviderType::OpenRouter.display_name().to_string(),
            })?;

        let body = self.to_openai_request(&request);
        debug!(model = %body.model, messages = body.messages.len(), "Sending OpenRouter request");

        let url = self.config.api_url("chat/completions");
        let response = send_with_retry(&self.config, || {
            let builder = self
                .client
                .post(&url)
                .bearer_auth(api_key.expose())
                .json(&body);
            apply_extra_headers(builder, &self.config)
        })
        .await?;

        let parsed: OpenAIResponse = read_json(response).await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LLMError::InvalidResponse("No choices in response".to_string()))?;

        Ok(CompletionResponse { content })
    }
}

// OpenAI API 类型定义

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    temperature: f32,
    max_tokens: u32,
    /// 只解析完整的 JSON 响应
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[cfg(test)]
mod tests {
    use super::super::base::test_support::spawn_upstream;
    use super::*;
    use crate::modules::chat::domain::ChatMessage;
    use crate::shared::{ApiKey, RetryPolicy};
    use axum::http::HeaderMap;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    type Captured = Arc<Mutex<Vec<(HeaderMap, Value)>>>;

    async fn upstream(reply: Value) -> (String, Captured) {
        let captured: Captured = Arc::new(Mutex::new(Vec::new()));
        let sink = captured.clone();
        let router = Router::new().route(
            "/chat/completions",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let sink = sink.clone();
                let reply = reply.clone();
                async move {
                    sink.lock().unwrap().push((headers, body));
                    Json(reply)
                }
            }),
        );
        (spawn_upstream(router).await, captured)
    }

    fn adapter(base_url: &str, key: Option<&str>) -> OpenRouterAdapter {
        let config = LLMProviderConfig::new(ProviderType::OpenRouter, base_url)
            .with_api_key(key.and_then(ApiKey::new))
            .with_header("HTTP-Referer", "https://vickykaai.com")
            .with_header("X-Title", "VICKY KA AI")
            .with_retry(RetryPolicy::none());
        OpenRouterAdapter::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_complete_sends_openai_shape() {
        let (base, captured) =
            upstream(json!({ "choices": [{ "message": { "role": "assistant", "content": "Hi!" } }] }))
                .await;
        let adapter = adapter(&base, Some("sk-or"));

        let request = CompletionRequest::new(
            vec![ChatMessage::system("be brief"), ChatMessage::user("Hello")],
            "openai/gpt-3.5-turbo",
        );
        let response = adapter.complete(request).await.unwrap();
        assert_eq!(response.content, "Hi!");

        let calls = captured.lock().unwrap();
        let (headers, body) = &calls[0];
        assert_eq!(headers["authorization"], "Bearer sk-or");
        assert_eq!(headers["http-referer"], "https://vickykaai.com");
        assert_eq!(headers["x-title"], "VICKY KA AI");
        assert_eq!(body["model"], "openai/gpt-3.5-turbo");
        assert_eq!(body["max_tokens"], 500);
        assert_eq!(body["stream"], false);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Hello");
    }

    #[tokio::test]
    async fn test_empty_choices_is_invalid_response() {
        let (base, _) = upstream(json!({ "choices": [] })).await;
        let adapter = adapter(&base, Some("sk-or"));

        let err = adapter
            .complete(CompletionRequest::new(vec![ChatMessage::user("x")], "m"))
            .await
            .unwrap_err();
        assert!(matches!(err, LLMError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_missing_key_short_circuits() {
        let (base, captured) = upstream(json!({})).await;
        let adapter = adapter(&base, None);
        assert!(!adapter.is_configured());

        let err = adapter
            .complete(CompletionRequest::new(vec![ChatMessage::user("x")], "m"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "OpenRouter API key not configured");
        assert!(captured.lock().unwrap().is_empty());
    }
}
