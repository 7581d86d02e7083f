use async_trait::async_trait;
use std::sync::Arc;

use super::super::{ActiveThread, ApplicationError, QueryHandler};
use crate::modules::chat::domain::ChatThread;
use crate::modules::chat::ports::ThreadRepository;

/// 获取当前活动线程查询
#[derive(Debug, Clone, Default)]
pub struct GetActiveThreadQuery;

/// 获取当前活动线程响应
#[derive(Debug, Clone)]
pub struct GetActiveThreadResponse {
    pub thread: Option<ChatThread>,
}

/// 获取当前活动线程处理器
pub struct GetActiveThreadHandler {
    thread_repository: Arc<dyn ThreadRepository>,
    active_thread: Arc<ActiveThread>,
}

impl GetActiveThreadHandler {
    pub fn new(
        thread_repository: Arc<dyn ThreadRepository>,
        active_thread: Arc<ActiveThread>,
    ) -> Self {
        Self {
            thread_repository,
            active_thread,
        }
    }
}

#[async_trait]
impl QueryHandler<GetActiveThreadQuery, GetActiveThreadResponse> for GetActiveThreadHandler {
    async fn handle(
        &self,
        _query: GetActiveThreadQuery,
    ) -> Result<GetActiveThreadResponse, ApplicationError> {
        let thread = match self.active_thread.get().await {
            Some(id) => self.thread_repository.get(id).await?,
            None => None,
        };
        Ok(GetActiveThreadResponse { thread })
    }
}
