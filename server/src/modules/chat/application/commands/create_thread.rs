use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use super::super::{ActiveThread, ApplicationError, CommandHandler};
use crate::modules::chat::domain::{ChatDomainEvent, ChatThread};
use crate::modules::chat::ports::{EventPublisher, ThreadRepository};

/// 创建线程命令
#[derive(Debug, Clone, Default)]
pub struct CreateThreadCommand;

/// 创建线程命令响应
#[derive(Debug, Clone)]
pub struct CreateThreadResponse {
    pub thread: ChatThread,
}

/// 创建线程命令处理器
///
/// 新线程写入欢迎轮次并成为当前活动线程
pub struct CreateThreadHandler {
    thread_repository: Arc<dyn ThreadRepository>,
    active_thread: Arc<ActiveThread>,
    events: Arc<dyn EventPublisher>,
    welcome_message: String,
}

impl CreateThreadHandler {
    pub fn new(
        thread_repository: Arc<dyn ThreadRepository>,
        active_thread: Arc<ActiveThread>,
        events: Arc<dyn EventPublisher>,
        welcome_message: impl Into<String>,
    ) -> Self {
        Self {
            thread_repository,
            active_thread,
            events,
            welcome_message: welcome_message.into(),
        }
    }
}

#[async_trait]
impl CommandHandler<CreateThreadCommand, CreateThreadResponse> for CreateThreadHandler {
    async fn handle(
        &self,
        _command: CreateThreadCommand,
    ) -> Result<CreateThreadResponse, ApplicationError> {
        let thread = ChatThread::new(self.welcome_message.clone());

        self.thread_repository.save(&thread).await?;
        self.active_thread.set(thread.id()).await;

        info!(thread_id = %thread.id(), "Thread created");
        self.events
            .publish(ChatDomainEvent::thread_created(thread.id(), thread.title()));
        self.events
            .publish(ChatDomainEvent::active_thread_changed(thread.id()));

        Ok(CreateThreadResponse { thread })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::EventBus;
    use crate::modules::chat::domain::{ThreadState, TurnKind};
    use crate::modules::chat::infrastructure::InMemoryThreadRepository;

    #[tokio::test]
    async fn test_create_thread_seeds_welcome_and_activates() {
        let repo = Arc::new(InMemoryThreadRepository::new());
        let active = Arc::new(ActiveThread::new());
        let bus = Arc::new(EventBus::new());
        let mut events = bus.subscribe();
        let handler = CreateThreadHandler::new(repo.clone(), active.clone(), bus, "Welcome!");

        let response = handler.handle(CreateThreadCommand).await.unwrap();
        let thread = response.thread;

        assert_eq!(thread.state(), ThreadState::Empty);
        assert_eq!(thread.turns()[0].kind(), TurnKind::Welcome);
        assert_eq!(thread.turns()[0].content(), "Welcome!");
        assert_eq!(active.get().await, Some(thread.id()));
        assert!(repo.get(thread.id()).await.unwrap().is_some());

        assert_eq!(events.recv().await.unwrap().event_type(), "thread.created");
        assert_eq!(events.recv().await.unwrap().event_type(), "thread.activated");
    }

    #[tokio::test]
    async fn test_created_ids_are_ordered() {
        let repo = Arc::new(InMemoryThreadRepository::new());
        let handler = CreateThreadHandler::new(
            repo,
            Arc::new(ActiveThread::new()),
            Arc::new(EventBus::new()),
            "Welcome!",
        );

        let first = handler.handle(CreateThreadCommand).await.unwrap().thread;
        let second = handler.handle(CreateThreadCommand).await.unwrap().thread;

        assert_ne!(first.id(), second.id());
        assert!(first.id() < second.id());
    }
}
