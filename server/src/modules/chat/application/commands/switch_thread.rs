use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::super::{ActiveThread, ApplicationError, CommandHandler};
use crate::modules::chat::domain::{ChatDomainEvent, ChatThread, ThreadId};
use crate::modules::chat::ports::{EventPublisher, ThreadRepository};

/// 切换活动线程命令
#[derive(Debug, Clone)]
pub struct SwitchThreadCommand {
    pub thread_id: ThreadId,
}

impl SwitchThreadCommand {
    pub fn new(thread_id: ThreadId) -> Self {
        Self { thread_id }
    }
}

/// 切换活动线程响应
#[derive(Debug, Clone)]
pub struct SwitchThreadResponse {
    pub thread: ChatThread,
}

/// 切换活动线程处理器
pub struct SwitchThreadHandler {
    thread_repository: Arc<dyn ThreadRepository>,
    active_thread: Arc<ActiveThread>,
    events: Arc<dyn EventPublisher>,
}

impl SwitchThreadHandler {
    pub fn new(
        thread_repository: Arc<dyn ThreadRepository>,
        active_thread: Arc<ActiveThread>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            thread_repository,
            active_thread,
            events,
        }
    }
}

#[async_trait]
impl CommandHandler<SwitchThreadCommand, SwitchThreadResponse> for SwitchThreadHandler {
    async fn handle(
        &self,
        command: SwitchThreadCommand,
    ) -> Result<SwitchThreadResponse, ApplicationError> {
        let thread = self
            .thread_repository
            .get(command.thread_id)
            .await?
            .ok_or_else(|| ApplicationError::ThreadNotFound(command.thread_id.to_string()))?;

        self.active_thread.set(thread.id()).await;
        debug!(thread_id = %thread.id(), "Active thread switched");
        self.events
            .publish(ChatDomainEvent::active_thread_changed(thread.id()));

        Ok(SwitchThreadResponse { thread })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::EventBus;
    use crate::modules::chat::infrastructure::InMemoryThreadRepository;

    #[tokio::test]
    async fn test_switch_to_existing_thread() {
        let repo = Arc::new(InMemoryThreadRepository::new());
        let thread = ChatThread::new("Welcome!");
        repo.save(&thread).await.unwrap();
        let active = Arc::new(ActiveThread::new());
        let handler = SwitchThreadHandler::new(repo, active.clone(), Arc::new(EventBus::new()));

        handler
            .handle(SwitchThreadCommand::new(thread.id()))
            .await
            .unwrap();

        assert_eq!(active.get().await, Some(thread.id()));
    }

    #[tokio::test]
    async fn test_switch_to_unknown_thread_keeps_current() {
        let repo = Arc::new(InMemoryThreadRepository::new());
        let active = Arc::new(ActiveThread::new());
        let current = ThreadId::new();
        active.set(current).await;
        let handler = SwitchThreadHandler::new(repo, active.clone(), Arc::new(EventBus::new()));

        let result = handler.handle(SwitchThreadCommand::new(ThreadId::new())).await;

        assert!(matches!(result, Err(ApplicationError::ThreadNotFound(_))));
        assert_eq!(active.get().await, Some(current));
    }
}
