use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::super::{ApplicationError, CommandHandler, ThreadLocks};
use crate::modules::chat::domain::{
    ChatDomainEvent, ChatThread, ChatTurn, ModelResult, ThreadId, TurnKind,
};
use crate::modules::chat::ports::{EventPublisher, ThreadRepository};

/// 追加助手轮次命令
///
/// `results` 必须是聚合完成后的完整结果
#[derive(Debug, Clone)]
pub struct AppendAssistantTurnCommand {
    pub thread_id: ThreadId,
    pub text: String,
    pub results: Vec<ModelResult>,
}

impl AppendAssistantTurnCommand {
    pub fn new(thread_id: ThreadId, text: impl Into<String>, results: Vec<ModelResult>) -> Self {
        Self {
            thread_id,
            text: text.into(),
            results,
        }
    }
}

/// 追加助手轮次响应
#[derive(Debug, Clone)]
pub struct AppendAssistantTurnResponse {
    pub turn: ChatTurn,
    pub thread: ChatThread,
}

/// 追加助手轮次处理器
pub struct AppendAssistantTurnHandler {
    thread_repository: Arc<dyn ThreadRepository>,
    locks: Arc<ThreadLocks>,
    events: Arc<dyn EventPublisher>,
}

impl AppendAssistantTurnHandler {
    pub fn new(
        thread_repository: Arc<dyn ThreadRepository>,
        locks: Arc<ThreadLocks>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            thread_repository,
            locks,
            events,
        }
    }

    /// 在调用方已持有线程锁时追加
    pub(crate) async fn append_locked(
        &self,
        command: AppendAssistantTurnCommand,
    ) -> Result<AppendAssistantTurnResponse, ApplicationError> {
        let thread_id = command.thread_id;
        let result_count = command.results.len();
        let text = command.text;
        let results = command.results;

        let thread = self
            .thread_repository
            .update(
                thread_id,
                Box::new(move |thread: &mut ChatThread| {
                    thread.append_assistant_turn(text, results);
                }),
            )
            .await
            .map_err(|e| ApplicationError::from_repository(thread_id, e))?;

        let turn = thread
            .last_turn()
            .filter(|t| t.kind() == TurnKind::Assistant)
            .cloned()
            .ok_or_else(|| {
                ApplicationError::InternalError("assistant turn was not appended".into())
            })?;

        debug!(thread_id = %thread_id, turn_id = %turn.id(), result_count, "Assistant turn appended");
        self.events.publish(ChatDomainEvent::turn_appended(
            thread_id,
            turn.id(),
            TurnKind::Assistant,
            result_count,
        ));

        Ok(AppendAssistantTurnResponse { turn, thread })
    }
}

#[async_trait]
impl CommandHandler<AppendAssistantTurnCommand, AppendAssistantTurnResponse>
    for AppendAssistantTurnHandler
{
    async fn handle(
        &self,
        command: AppendAssistantTurnCommand,
    ) -> Result<AppendAssistantTurnResponse, ApplicationError> {
        let _guard = self.locks.acquire(command.thread_id).await;
        self.append_locked(command).await
    }
}
