// Chat Application Layer - 应用层
// 实现 CQRS 模式的命令和查询处理器

pub mod aggregator;
pub mod commands;
pub mod queries;
mod thread_state;

// 导出命令和查询
pub use aggregator::*;
pub use commands::*;
pub use queries::*;
pub use thread_state::*;

use async_trait::async_trait;
use thiserror::Error;

use super::domain::ThreadId;
use super::ports::RepositoryError;

/// 应用层错误类型
///
/// 模型调用失败不会出现在这里，它们体现在 `ModelResult.error`
#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 将仓储的 NotFound 转换为 ThreadNotFound
    pub(crate) fn from_repository(id: ThreadId, err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(_) => ApplicationError::ThreadNotFound(id.to_string()),
        }
    }
}

/// 命令处理器 trait
///
/// 遵循 CQRS 模式，命令处理器负责执行有副作用的操作
#[async_trait]
pub trait CommandHandler<C, R>: Send + Sync
where
    C: Send + Sync,
{
    /// 执行命令
    async fn handle(&self, command: C) -> Result<R, ApplicationError>;
}

/// 查询处理器 trait
///
/// 遵循 CQRS 模式，查询处理器负责只读操作
#[async_trait]
pub trait QueryHandler<Q, R>: Send + Sync
where
    Q: Send + Sync,
{
    /// 执行查询
    async fn handle(&self, query: Q) -> Result<R, ApplicationError>;
}
