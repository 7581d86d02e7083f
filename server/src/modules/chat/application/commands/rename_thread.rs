use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use super::super::{ApplicationError, CommandHandler};
use crate::modules::chat::domain::{ChatDomainEvent, ChatThread, ThreadId};
use crate::modules::chat::ports::{EventPublisher, ThreadRepository};

/// 重命名线程命令
#[derive(Debug, Clone)]
pub struct RenameThreadCommand {
    pub thread_id: ThreadId,
    pub title: String,
}

impl RenameThreadCommand {
    pub fn new(thread_id: ThreadId, title: impl Into<String>) -> Self {
        Self {
            thread_id,
            title: title.into(),
        }
    }
}

/// 重命名线程响应
#[derive(Debug, Clone)]
pub struct RenameThreadResponse {
    pub thread: ChatThread,
}

/// 重命名线程处理器
///
/// 手动标题之后不再被自动标题覆盖
pub struct RenameThreadHandler {
    thread_repository: Arc<dyn ThreadRepository>,
    events: Arc<dyn EventPublisher>,
}

impl RenameThreadHandler {
    pub fn new(
        thread_repository: Arc<dyn ThreadRepository>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            thread_repository,
            events,
        }
    }
}

#[async_trait]
impl CommandHandler<RenameThreadCommand, RenameThreadResponse> for RenameThreadHandler {
    async fn handle(
        &self,
        command: RenameThreadCommand,
    ) -> Result<RenameThreadResponse, ApplicationError> {
        let title = command.title.trim().to_string();
        if title.is_empty() {
            return Err(ApplicationError::ValidationError(
                "Thread title cannot be empty".to_string(),
            ));
        }

        let thread_id = command.thread_id;
        let thread = self
            .thread_repository
            .update(
                thread_id,
                Box::new(move |thread: &mut ChatThread| thread.rename(title)),
            )
            .await
            .map_err(|e| ApplicationError::from_repository(thread_id, e))?;

        info!(thread_id = %thread_id, title = thread.title(), "Thread renamed");
        self.events
            .publish(ChatDomainEvent::thread_renamed(thread_id, thread.title(), true));

        Ok(RenameThreadResponse { thread })
    }
}
