use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

use crate::modules::chat::ports::{
    CompletionRequest, CompletionResponse, LLMError, LLMPort, ProviderType,
};

/// Mock 适配器的行为
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// 返回固定内容
    Reply(String),
    /// 返回对应状态码的上游错误
    FailStatus(u16),
    /// 延迟后返回内容
    Delay(Duration, String),
    /// 2xx 但结构不符
    Malformed,
    /// 未配置凭据
    MissingKey,
}

/// 测试用 LLM 适配器，记录收到的请求
pub struct MockLLMAdapter {
    provider_type: ProviderType,
    behavior: MockBehavior,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockLLMAdapter {
    pub fn new(provider_type: ProviderType, behavior: MockBehavior) -> Self {
        Self {
            provider_type,
            behavior,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(provider_type: ProviderType, content: &str) -> Self {
        Self::new(provider_type, MockBehavior::Reply(content.to_string()))
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMPort for MockLLMAdapter {
    fn provider_id(&self) -> &str {
        "mock"
    }

    fn provider_type(&self) -> ProviderType {
        self.provider_type
    }

    fn is_configured(&self) -> bool {
        !matches!(self.behavior, MockBehavior::MissingKey)
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LLMError> {
        self.requests.lock().unwrap().push(request);
        match &self.behavior {
            MockBehavior::Reply(content) => Ok(CompletionResponse {
                content: content.clone(),
            }),
            MockBehavior::FailStatus(status) => Err(LLMError::ApiError {
                status: *status,
                message: "mock failure".to_string(),
            }),
            MockBehavior::Delay(delay, content) => {
                tokio::time::sleep(*delay).await;
                Ok(CompletionResponse {
                    content: content.clone(),
                })
            }
            MockBehavior::Malformed => Err(LLMError::InvalidResponse("mock".to_string())),
            MockBehavior::MissingKey => Err(LLMError::MissingApiKey {
                provider: self.provider_type.display_name().to_string(),
            }),
        }
    }
}
