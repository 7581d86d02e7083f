use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::super::{ApplicationError, CommandHandler, ThreadLocks};
use crate::modules::chat::domain::{
    ChatDomainEvent, ChatThread, ChatTurn, ThreadId, TitleClassifier, TitleSource, TurnKind,
};
use crate::modules::chat::ports::{EventPublisher, ThreadRepository};

/// 追加用户轮次命令
#[derive(Debug, Clone)]
pub struct AppendUserTurnCommand {
    pub thread_id: ThreadId,
    pub text: String,
}

impl AppendUserTurnCommand {
    pub fn new(thread_id: ThreadId, text: impl Into<String>) -> Self {
        Self {
            thread_id,
            text: text.into(),
        }
    }
}

/// 追加用户轮次响应
#[derive(Debug, Clone)]
pub struct AppendUserTurnResponse {
    pub turn: ChatTurn,
    pub thread: ChatThread,
    /// 本次是否由标题分类器生成了新标题
    pub title_suggested: bool,
}

/// 追加用户轮次处理器
///
/// 第一条用户消息会触发标题分类（手动命名过的线程除外）
pub struct AppendUserTurnHandler {
    thread_repository: Arc<dyn ThreadRepository>,
    locks: Arc<ThreadLocks>,
    events: Arc<dyn EventPublisher>,
    classifier: TitleClassifier,
}

impl AppendUserTurnHandler {
    pub fn new(
        thread_repository: Arc<dyn ThreadRepository>,
        locks: Arc<ThreadLocks>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            thread_repository,
            locks,
            events,
            classifier: TitleClassifier::new(),
        }
    }

    /// 在调用方已持有线程锁时追加
    pub(crate) async fn append_locked(
        &self,
        command: AppendUserTurnCommand,
    ) -> Result<AppendUserTurnResponse, ApplicationError> {
        let thread_id = command.thread_id;
        let suggested = self.classifier.classify(&command.text);
        let text = command.text;

        let thread = self
            .thread_repository
            .update(
                thread_id,
                Box::new(move |thread: &mut ChatThread| {
                    thread.append_user_turn(text);
                    thread.apply_suggested_title(suggested);
                }),
            )
            .await
            .map_err(|e| ApplicationError::from_repository(thread_id, e))?;

        let turn = thread
            .last_turn()
            .filter(|t| t.kind() == TurnKind::User)
            .cloned()
            .ok_or_else(|| ApplicationError::InternalError("user turn was not appended".into()))?;

        let title_suggested =
            thread.user_turn_count() == 1 && thread.title_source() == TitleSource::Heuristic;

        debug!(thread_id = %thread_id, turn_id = %turn.id(), "User turn appended");
        self.events.publish(ChatDomainEvent::turn_appended(
            thread_id,
            turn.id(),
            TurnKind::User,
            0,
        ));
        if title_suggested {
            self.events.publish(ChatDomainEvent::thread_renamed(
                thread_id,
                thread.title(),
                false,
            ));
        }

        Ok(AppendUserTurnResponse {
            turn,
            thread,
            title_suggested,
        })
    }
}

#[async_trait]
impl CommandHandler<AppendUserTurnCommand, AppendUserTurnResponse> for AppendUserTurnHandler {
    async fn handle(
        &self,
        command: AppendUserTurnCommand,
    ) -> Result<AppendUserTurnResponse, ApplicationError> {
        let _guard = self.locks.acquire(command.thread_id).await;
        self.append_locked(command).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::EventBus;
    use crate::modules::chat::infrastructure::InMemoryThreadRepository;

    async fn setup() -> (AppendUserTurnHandler, Arc<InMemoryThreadRepository>, ThreadId) {
        let repo = Arc::new(InMemoryThreadRepository::new());
        let thread = ChatThread::new("Welcome!");
        repo.save(&thread).await.unwrap();
        let handler = AppendUserTurnHandler::new(
            repo.clone(),
            Arc::new(ThreadLocks::new()),
            Arc::new(EventBus::new()),
        );
        (handler, repo, thread.id())
    }

    #[tokio::test]
    async fn test_first_user_turn_sets_heuristic_title() {
        let (handler, _, id) = setup().await;

        let response = handler
            .handle(AppendUserTurnCommand::new(
                id,
                "Can you help me with a python recipe for dinner?",
            ))
            .await
            .unwrap();

        assert!(response.title_suggested);
        assert_eq!(response.thread.title(), "Code Discussion");
        assert!(response.turn.results().is_empty());
    }

    #[tokio::test]
    async fn test_later_turns_keep_title() {
        let (handler, repo, id) = setup().await;

        handler
            .handle(AppendUserTurnCommand::new(id, "plan a trip to Rome"))
            .await
            .unwrap();
        let response = handler
            .handle(AppendUserTurnCommand::new(id, "now a python script"))
            .await
            .unwrap();

        assert!(!response.title_suggested);
        assert_eq!(response.thread.title(), "Travel Planning");
        assert_eq!(repo.get(id).await.unwrap().unwrap().user_turn_count(), 2);
    }

    #[tokio::test]
    async fn test_manual_title_is_kept() {
        let (handler, repo, id) = setup().await;
        repo.update(id, Box::new(|t: &mut ChatThread| t.rename("Mine")))
            .await
            .unwrap();

        let response = handler
            .handle(AppendUserTurnCommand::new(id, "python question"))
            .await
            .unwrap();

        assert!(!response.title_suggested);
        assert_eq!(response.thread.title(), "Mine");
    }

    #[tokio::test]
    async fn test_unknown_thread_fails() {
        let (handler, _, _) = setup().await;

        let result = handler
            .handle(AppendUserTurnCommand::new(ThreadId::new(), "hello"))
            .await;

        assert!(matches!(result, Err(ApplicationError::ThreadNotFound(_))));
    }
}
