use async_trait::async_trait;
use thiserror::Error;

use super::super::domain::{ChatThread, ThreadId};

/// 仓储错误类型
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),
}

/// 分页参数
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// 跳过的条数；页码过大时饱和而不溢出
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.limit as usize)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 50 }
    }
}

/// 分页结果
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: u32,
    pub limit: u32,
}

impl<T> PaginatedResult<T> {
    pub fn new(items: Vec<T>, total: usize, pagination: Pagination) -> Self {
        Self {
            items,
            total,
            page: pagination.page,
            limit: pagination.limit,
        }
    }

    pub fn has_next(&self) -> bool {
        (self.page as usize).saturating_mul(self.limit as usize) < self.total
    }
}

/// 对线程的原子修改
pub type ThreadMutation = Box<dyn FnOnce(&mut ChatThread) + Send>;

/// 线程仓储端口
///
/// 定义线程存储的抽象接口
#[async_trait]
pub trait ThreadRepository: Send + Sync {
    /// 根据 ID 获取线程
    async fn get(&self, id: ThreadId) -> Result<Option<ChatThread>, RepositoryError>;

    /// 保存线程（创建或覆盖）
    async fn save(&self, thread: &ChatThread) -> Result<(), RepositoryError>;

    /// 在存储锁内修改线程并返回修改后的副本
    async fn update(
        &self,
        id: ThreadId,
        mutation: ThreadMutation,
    ) -> Result<ChatThread, RepositoryError>;

    /// 获取所有线程（按最近活动倒序分页）
    async fn find_all(
        &self,
        pagination: Pagination,
    ) -> Result<PaginatedResult<ChatThread>, RepositoryError>;

    /// 检查线程是否存在
    async fn exists(&self, id: ThreadId) -> Result<bool, RepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        assert_eq!(Pagination::default().offset(), 0);
        assert_eq!(Pagination::new(0, 10).offset(), 0);
        assert_eq!(Pagination::new(3, 10).offset(), 20);
    }

    #[test]
    fn test_offset_with_huge_page() {
        let pagination = Pagination::new(u32::MAX, 200);
        assert_eq!(pagination.offset(), (u32::MAX as usize - 1) * 200);

        let result: PaginatedResult<()> = PaginatedResult::new(Vec::new(), 3, pagination);
        assert!(!result.has_next());
    }
}
