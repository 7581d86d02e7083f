use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use super::ApplicationError;
use crate::modules::chat::domain::{ChatMessage, ModelResult};
use crate::modules::chat::ports::ModelInvoker;

/// 未选择任何模型时的提示
pub const EMPTY_SELECTION_MESSAGE: &str = "Please select at least one AI model";

/// 发送前校验模型选择
///
/// 空选择是唯一会阻止调用的错误
pub fn validate_selection(selected_models: &[String]) -> Result<(), ApplicationError> {
    if selected_models.is_empty() {
        return Err(ApplicationError::ValidationError(
            EMPTY_SELECTION_MESSAGE.to_string(),
        ));
    }
    Ok(())
}

/// 响应聚合器
///
/// 并发调用每个被选中的模型，等待全部完成后按选择顺序返回结果。
/// 单个模型失败不会取消或截断其他调用；重复的模型标识会各自独立调用。
#[derive(Clone)]
pub struct ResponseAggregator {
    invoker: Arc<dyn ModelInvoker>,
}

impl ResponseAggregator {
    pub fn new(invoker: Arc<dyn ModelInvoker>) -> Self {
        Self { invoker }
    }

    pub async fn aggregate(
        &self,
        selected_models: &[String],
        conversation: &[ChatMessage],
    ) -> Vec<ModelResult> {
        if selected_models.is_empty() {
            debug!("Empty model selection, nothing to dispatch");
            return Vec::new();
        }

        let started = Instant::now();
        let invocations = selected_models
            .iter()
            .map(|model| self.invoker.invoke(model, conversation));
        let results = join_all(invocations).await;

        let failed = results.iter().filter(|r| !r.is_success()).count();
        info!(
            models = selected_models.len(),
            failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Aggregation settled"
        );

        results
    }

    pub fn invoker(&self) -> &Arc<dyn ModelInvoker> {
        &self.invoker
    }
}
