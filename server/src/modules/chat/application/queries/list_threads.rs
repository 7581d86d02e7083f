use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use super::super::{ApplicationError, QueryHandler};
use super::ThreadSummary;
use crate::modules::chat::ports::{Pagination, ThreadRepository};

/// 列出线程查询
#[derive(Debug, Clone, Default)]
pub struct ListThreadsQuery {
    pub pagination: Pagination,
}

impl ListThreadsQuery {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            pagination: Pagination::new(page, limit),
        }
    }
}

/// 列出线程查询响应
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListThreadsResponse {
    pub threads: Vec<ThreadSummary>,
    pub total: usize,
    pub page: u32,
    pub limit: u32,
    pub has_next: bool,
}

/// 列出线程查询处理器
///
/// 最近活动的线程在前
pub struct ListThreadsHandler {
    thread_repository: Arc<dyn ThreadRepository>,
}

impl ListThreadsHandler {
    pub fn new(thread_repository: Arc<dyn ThreadRepository>) -> Self {
        Self { thread_repository }
    }
}

#[async_trait]
impl QueryHandler<ListThreadsQuery, ListThreadsResponse> for ListThreadsHandler {
    async fn handle(
        &self,
        query: ListThreadsQuery,
    ) -> Result<ListThreadsResponse, ApplicationError> {
        let result = self.thread_repository.find_all(query.pagination).await?;
        let now = Utc::now();
        let has_next = result.has_next();

        Ok(ListThreadsResponse {
            threads: result
                .items
                .iter()
                .map(|thread| ThreadSummary::new(thread, now))
                .collect(),
            total: result.total,
            page: result.page,
            limit: result.limit,
            has_next,
        })
    }
}
