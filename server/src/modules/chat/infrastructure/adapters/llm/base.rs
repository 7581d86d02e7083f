// 适配器公共 HTTP 实现
//
// 客户端构建、状态码映射与重试，三个提供商共用

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use crate::modules::chat::ports::{LLMError, LLMProviderConfig};

/// 构建带超时的 HTTP 客户端
pub(crate) fn build_client(timeout_secs: u64) -> Result<Client, LLMError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| LLMError::Unknown(e.to_string()))
}

/// 为请求附加配置中的额外请求头
pub(crate) fn apply_extra_headers(
    mut builder: RequestBuilder,
    config: &LLMProviderConfig,
) -> RequestBuilder {
    for (name, value) in &config.extra_headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// 发送请求，对可重试错误按配置的策略退避重试
///
/// `build` 每次尝试都会被调用一次，因为 `RequestBuilder` 发送后即被消耗
pub(crate) async fn send_with_retry<F>(
    config: &LLMProviderConfig,
    build: F,
) -> Result<Response, LLMError>
where
    F: Fn() -> RequestBuilder,
{
    let provider = config.provider_type.display_name();
    let mut attempt: u32 = 0;

    loop {
        match send_once(build(), config.timeout_secs).await {
            Ok(response) => return Ok(response),
            Err(err) if err.is_retryable() && attempt < config.retry.max_retries => {
                let backoff = config.retry.backoff_for(attempt);
                warn!(
                    provider,
                    attempt = attempt + 1,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %err,
                    "Retrying upstream request"
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

async fn send_once(builder: RequestBuilder, timeout_secs: u64) -> Result<Response, LLMError> {
    let response = builder.send().await.map_err(|e| {
        if e.is_timeout() {
            LLMError::Timeout {
                after_secs: timeout_secs,
            }
        } else {
            // URL 可能带有查询参数形式的密钥
            LLMError::NetworkError(e.without_url().to_string())
        }
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    debug!(status = status.as_u16(), body = %body, "Upstream returned error status");

    if status.as_u16() == 429 {
        return Err(LLMError::RateLimitError);
    }
    Err(LLMError::ApiError {
        status: status.as_u16(),
        message: body,
    })
}

/// 解析 JSON 响应体，结构不符时返回 `InvalidResponse`
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, LLMError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| LLMError::NetworkError(e.without_url().to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| LLMError::InvalidResponse(e.to_string()))
}

/// 测试用的本地假上游
#[cfg(test)]
pub(crate) mod test_support {
    use axum::Router;
    use tokio::net::TcpListener;

    /// 在随机端口上启动路由，返回基础 URL
    pub async fn spawn_upstream(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }
}
