use async_trait::async_trait;
use std::sync::Arc;

use super::super::{ApplicationError, QueryHandler};
use crate::modules::chat::domain::{ChatThread, ThreadId};
use crate::modules::chat::ports::ThreadRepository;

/// 获取线程查询
#[derive(Debug, Clone)]
pub struct GetThreadQuery {
    pub thread_id: ThreadId,
}

impl GetThreadQuery {
    pub fn new(thread_id: ThreadId) -> Self {
        Self { thread_id }
    }
}

/// 获取线程查询响应
#[derive(Debug, Clone)]
pub struct GetThreadResponse {
    pub thread: Option<ChatThread>,
}

/// 获取线程查询处理器
pub struct GetThreadHandler {
    thread_repository: Arc<dyn ThreadRepository>,
}

impl GetThreadHandler {
    pub fn new(thread_repository: Arc<dyn ThreadRepository>) -> Self {
        Self { thread_repository }
    }
}

#[async_trait]
impl QueryHandler<GetThreadQuery, GetThreadResponse> for GetThreadHandler {
    async fn handle(&self, query: GetThreadQuery) -> Result<GetThreadResponse, ApplicationError> {
        let thread = self.thread_repository.get(query.thread_id).await?;
        Ok(GetThreadResponse { thread })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::chat::infrastructure::InMemoryThreadRepository;

    #[tokio::test]
    async fn test_get_thread() {
        let repo = Arc::new(InMemoryThreadRepository::new());
        let thread = ChatThread::new("Welcome!");
        repo.save(&thread).await.unwrap();
        let handler = GetThreadHandler::new(repo);

        let found = handler.handle(GetThreadQuery::new(thread.id())).await.unwrap();
        assert_eq!(found.thread.map(|t| t.id()), Some(thread.id()));

        let missing = handler.handle(GetThreadQuery::new(ThreadId::new())).await.unwrap();
        assert!(missing.thread.is_none());
    }
}
