use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::modules::chat::domain::{ChatThread, ThreadId};
use crate::modules::chat::ports::{
    PaginatedResult, Pagination, RepositoryError, ThreadMutation, ThreadRepository,
};

/// 内存线程仓储
///
/// 不做持久化，也不做淘汰
pub struct InMemoryThreadRepository {
    threads: RwLock<HashMap<ThreadId, ChatThread>>,
}

impl InMemoryThreadRepository {
    pub fn new() -> Self {
        Self {
            threads: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryThreadRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ThreadRepository for InMemoryThreadRepository {
    async fn get(&self, id: ThreadId) -> Result<Option<ChatThread>, RepositoryError> {
        let threads = self.threads.read().await;
        Ok(threads.get(&id).cloned())
    }

    async fn save(&self, thread: &ChatThread) -> Result<(), RepositoryError> {
        let mut threads = self.threads.write().await;
        threads.insert(thread.id(), thread.clone());
        Ok(())
    }

    async fn update(
        &self,
        id: ThreadId,
        mutation: ThreadMutation,
    ) -> Result<ChatThread, RepositoryError> {
        let mut threads = self.threads.write().await;
        let thread = threads
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        mutation(thread);
        Ok(thread.clone())
    }

    async fn find_all(
        &self,
        pagination: Pagination,
    ) -> Result<PaginatedResult<ChatThread>, RepositoryError> {
        let threads = self.threads.read().await;

        // 最近活动在前，同一时刻按 ID（v7，随创建时间递增）倒序
        let mut all_threads: Vec<ChatThread> = threads.values().cloned().collect();
        all_threads.sort_by(|a, b| {
            b.updated_at()
                .cmp(&a.updated_at())
                .then_with(|| b.id().cmp(&a.id()))
        });

        let total = all_threads.len();
        let offset = pagination.offset();
        let limit = pagination.limit as usize;

        let items = if offset < total {
            all_threads[offset..total.min(offset + limit)].to_vec()
        } else {
            Vec::new()
        };

        Ok(PaginatedResult::new(items, total, pagination))
    }

    async fn exists(&self, id: ThreadId) -> Result<bool, RepositoryError> {
        let threads = self.threads.read().await;
        Ok(threads.contains_key(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_get() {
        let repo = InMemoryThreadRepository::new();
        let thread = ChatThread::new("Welcome!");
        let id = thread.id();

        repo.save(&thread).await.unwrap();
        let retrieved = repo.get(id).await.unwrap();

        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap().title(), "New Chat");
        assert!(repo.exists(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_applies_mutation() {
        let repo = InMemoryThreadRepository::new();
        let thread = ChatThread::new("Welcome!");
        let id = thread.id();
        repo.save(&thread).await.unwrap();

        let updated = repo
            .update(
                id,
                Box::new(|t: &mut ChatThread| {
                    t.append_user_turn("hello");
                }),
            )
            .await
            .unwrap();

        assert_eq!(updated.turns().len(), 2);
        assert_eq!(repo.get(id).await.unwrap().unwrap().turns().len(), 2);
    }

    #[tokio::test]
    async fn test_update_unknown_thread() {
        let repo = InMemoryThreadRepository::new();
        let result = repo.update(ThreadId::new(), Box::new(|_: &mut ChatThread| {})).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_all_orders_by_recent_activity() {
        let repo = InMemoryThreadRepository::new();
        let first = ChatThread::new("Welcome!");
        let second = ChatThread::new("Welcome!");
        repo.save(&first).await.unwrap();
        repo.save(&second).await.unwrap();

        // 旧线程有新活动后排到最前
        repo.update(
            first.id(),
            Box::new(|t: &mut ChatThread| {
                t.append_user_turn("bump");
            }),
        )
        .await
        .unwrap();

        let page = repo.find_all(Pagination::default()).await.unwrap();
        assert_eq!(page.items[0].id(), first.id());
        assert_eq!(page.items[1].id(), second.id());
    }

    #[tokio::test]
    async fn test_pagination() {
        let repo = InMemoryThreadRepository::new();

        for _ in 0..25 {
            repo.save(&ChatThread::new("Welcome!")).await.unwrap();
        }

        let page1 = repo.find_all(Pagination::new(1, 10)).await.unwrap();
        assert_eq!(page1.items.len(), 10);
        assert_eq!(page1.total, 25);
        assert!(page1.has_next());

        let page3 = repo.find_all(Pagination::new(3, 10)).await.unwrap();
        assert_eq!(page3.items.len(), 5);
        assert!(!page3.has_next());
    }

    #[tokio::test]
    async fn test_page_far_past_the_end_is_empty() {
        let repo = InMemoryThreadRepository::new();
        repo.save(&ChatThread::new("Welcome!")).await.unwrap();

        let page = repo.find_all(Pagination::new(u32::MAX, 200)).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 1);
        assert_eq!(page.page, u32::MAX);
    }
}
