use serde::{Deserialize, Serialize};

/// 不支持的模型对应的错误标记
pub const MODEL_NOT_SUPPORTED: &str = "Model not supported";
/// 缺少凭据对应的错误标记
pub const MISSING_API_KEY: &str = "Missing API key";

/// 单个模型的调用结果
///
/// 每次聚合调用中，每个被选中的模型恰好对应一条结果。
/// `error` 存在时，`content` 只包含面向用户的提示文本，不包含原始异常信息。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelResult {
    pub model: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ModelResult {
    pub fn success(model: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            content: content.into(),
            error: None,
        }
    }

    pub fn failure(
        model: impl Into<String>,
        content: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            content: content.into(),
            error: Some(error.into()),
        }
    }

    /// 路由表中不存在的模型
    pub fn unsupported(model: impl Into<String>) -> Self {
        let model = model.into();
        let content = format!("{} integration not implemented yet", model);
        Self::failure(model, content, MODEL_NOT_SUPPORTED)
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_result_shape() {
        let result = ModelResult::unsupported("X");
        assert_eq!(result.model, "X");
        assert_eq!(result.content, "X integration not implemented yet");
        assert_eq!(result.error.as_deref(), Some("Model not supported"));
        assert!(!result.is_success());
    }

    #[test]
    fn test_success_omits_error_field() {
        let json = serde_json::to_value(ModelResult::success("GPT-4", "hello")).unwrap();
        assert_eq!(json, serde_json::json!({ "model": "GPT-4", "content": "hello" }));
    }
}
