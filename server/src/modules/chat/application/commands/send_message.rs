use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use super::super::{
    validate_selection, ApplicationError, CommandHandler, ResponseAggregator, ThreadLocks,
};
use super::{
    AppendAssistantTurnCommand, AppendAssistantTurnHandler, AppendUserTurnCommand,
    AppendUserTurnHandler,
};
use crate::modules::chat::domain::{
    ChatThread, ChatTurn, ContextBuilder, ModelResult, ThreadId,
};
use crate::modules::chat::ports::ThreadRepository;

/// 全部模型失败时助手轮次的文本
pub const ALL_MODELS_FAILED: &str = "All selected models failed to respond.";

/// 发送消息命令
#[derive(Debug, Clone)]
pub struct SendMessageCommand {
    /// 线程 ID
    pub thread_id: ThreadId,
    /// 用户消息内容
    pub content: String,
    /// 选中的模型，按显示顺序
    pub selected_models: Vec<String>,
}

impl SendMessageCommand {
    pub fn new(
        thread_id: ThreadId,
        content: impl Into<String>,
        selected_models: Vec<String>,
    ) -> Self {
        Self {
            thread_id,
            content: content.into(),
            selected_models,
        }
    }
}

/// 发送消息响应
#[derive(Debug, Clone)]
pub struct SendMessageResponse {
    pub user_turn: ChatTurn,
    pub assistant_turn: ChatTurn,
    pub thread: ChatThread,
}

/// 发送消息命令处理器
///
/// 在线程锁内依次完成：追加用户轮次、构建上下文、并发调用、追加助手轮次。
/// 助手轮次只在聚合全部完成后写入。整轮在独立任务中运行，
/// 调用方放弃等待时仍会写完助手轮次。
pub struct SendMessageHandler {
    round: Arc<MessageRound>,
}

struct MessageRound {
    thread_repository: Arc<dyn ThreadRepository>,
    locks: Arc<ThreadLocks>,
    aggregator: ResponseAggregator,
    context_builder: ContextBuilder,
    user_turns: Arc<AppendUserTurnHandler>,
    assistant_turns: Arc<AppendAssistantTurnHandler>,
}

impl SendMessageHandler {
    pub fn new(
        thread_repository: Arc<dyn ThreadRepository>,
        locks: Arc<ThreadLocks>,
        aggregator: ResponseAggregator,
        context_builder: ContextBuilder,
        user_turns: Arc<AppendUserTurnHandler>,
        assistant_turns: Arc<AppendAssistantTurnHandler>,
    ) -> Self {
        Self {
            round: Arc::new(MessageRound {
                thread_repository,
                locks,
                aggregator,
                context_builder,
                user_turns,
                assistant_turns,
            }),
        }
    }

    /// 将成功的结果渲染为 "<model>: <content>"，以空行分隔
    pub fn render_assistant_text(results: &[ModelResult]) -> String {
        let rendered: Vec<String> = results
            .iter()
            .filter(|r| r.is_success())
            .map(|r| format!("{}: {}", r.model, r.content))
            .collect();

        if rendered.is_empty() {
            ALL_MODELS_FAILED.to_string()
        } else {
            rendered.join("\n\n")
        }
    }
}

impl MessageRound {
    async fn run(
        &self,
        thread_id: ThreadId,
        content: String,
        selected_models: Vec<String>,
    ) -> Result<SendMessageResponse, ApplicationError> {
        let _guard = self.locks.acquire(thread_id).await;

        // 上下文取自追加之前的历史
        let history = self
            .thread_repository
            .get(thread_id)
            .await?
            .ok_or_else(|| ApplicationError::ThreadNotFound(thread_id.to_string()))?;
        let conversation = self
            .context_builder
            .build(history.conversation_turns(), &content);

        let user = self
            .user_turns
            .append_locked(AppendUserTurnCommand::new(thread_id, content))
            .await?;

        let results = self
            .aggregator
            .aggregate(&selected_models, &conversation)
            .await;
        let text = SendMessageHandler::render_assistant_text(&results);

        let assistant = self
            .assistant_turns
            .append_locked(AppendAssistantTurnCommand::new(thread_id, text, results))
            .await?;

        info!(
            thread_id = %thread_id,
            models = selected_models.len(),
            "Message round completed"
        );

        Ok(SendMessageResponse {
            user_turn: user.turn,
            assistant_turn: assistant.turn,
            thread: assistant.thread,
        })
    }
}

#[async_trait]
impl CommandHandler<SendMessageCommand, SendMessageResponse> for SendMessageHandler {
    async fn handle(
        &self,
        command: SendMessageCommand,
    ) -> Result<SendMessageResponse, ApplicationError> {
        let content = command.content.trim().to_string();
        if content.is_empty() {
            return Err(ApplicationError::ValidationError(
                "Message cannot be empty".to_string(),
            ));
        }
        validate_selection(&command.selected_models)?;

        // 未知线程不占用锁表
        let thread_id = command.thread_id;
        if !self.round.thread_repository.exists(thread_id).await? {
            return Err(ApplicationError::ThreadNotFound(thread_id.to_string()));
        }

        let round = self.round.clone();
        let selected_models = command.selected_models;
        tokio::spawn(async move { round.run(thread_id, content, selected_models).await })
            .await
            .map_err(|e| ApplicationError::InternalError(format!("Message round aborted: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::EventBus;
    use crate::modules::chat::domain::{MessageRole, TurnKind};
    use crate::modules::chat::infrastructure::adapters::llm::{
        GenerationParams, MockBehavior, MockLLMAdapter, ModelRegistry,
    };
    use crate::modules::chat::infrastructure::InMemoryThreadRepository;
    use crate::modules::chat::ports::{EventPublisher, ProviderType};
    use std::time::Duration;

    struct Fixture {
        handler: SendMessageHandler,
        repo: Arc<InMemoryThreadRepository>,
        locks: Arc<ThreadLocks>,
        open_router: Arc<MockLLMAdapter>,
        thread_id: ThreadId,
    }

    async fn fixture(gemini: MockBehavior) -> Fixture {
        let repo = Arc::new(InMemoryThreadRepository::new());
        let thread = ChatThread::new("Welcome!");
        repo.save(&thread).await.unwrap();

        let open_router = Arc::new(MockLLMAdapter::replying(ProviderType::OpenRouter, "four"));
        let mut registry = ModelRegistry::new(GenerationParams::default());
        registry.register_adapter(open_router.clone());
        registry.register_adapter(Arc::new(MockLLMAdapter::new(ProviderType::Gemini, gemini)));
        registry.add_route("GPT-4", ProviderType::OpenRouter, "openai/gpt-3.5-turbo");
        registry.add_route("Gemini", ProviderType::Gemini, "gemini-pro");

        let locks = Arc::new(ThreadLocks::new());
        let events: Arc<dyn EventPublisher> = Arc::new(EventBus::new());
        let handler = SendMessageHandler::new(
            repo.clone(),
            locks.clone(),
            ResponseAggregator::new(Arc::new(registry)),
            ContextBuilder::new().with_system_prompt("Be concise."),
            Arc::new(AppendUserTurnHandler::new(
                repo.clone(),
                locks.clone(),
                events.clone(),
            )),
            Arc::new(AppendAssistantTurnHandler::new(
                repo.clone(),
                locks.clone(),
                events,
            )),
        );

        Fixture {
            handler,
            repo,
            locks,
            open_router,
            thread_id: thread.id(),
        }
    }

    fn models(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_send_records_both_turns() {
        let f = fixture(MockBehavior::FailStatus(502)).await;

        let response = f
            .handler
            .handle(SendMessageCommand::new(
                f.thread_id,
                "What is 2+2 in math?",
                models(&["GPT-4", "Gemini"]),
            ))
            .await
            .unwrap();

        assert_eq!(response.user_turn.kind(), TurnKind::User);
        assert_eq!(response.assistant_turn.results().len(), 2);
        assert_eq!(response.assistant_turn.content(), "GPT-4: four");
        assert_eq!(response.thread.title(), "Math Help");

        let stored = f.repo.get(f.thread_id).await.unwrap().unwrap();
        assert_eq!(stored.turns().len(), 3);
    }

    #[tokio::test]
    async fn test_context_excludes_welcome_and_includes_history() {
        let f = fixture(MockBehavior::Reply("ok".to_string())).await;

        f.handler
            .handle(SendMessageCommand::new(f.thread_id, "first", models(&["GPT-4"])))
            .await
            .unwrap();
        f.handler
            .handle(SendMessageCommand::new(f.thread_id, "second", models(&["GPT-4"])))
            .await
            .unwrap();

        let requests = f.open_router.requests();
        let second = &requests[1].messages;
        let roles: Vec<MessageRole> = second.iter().map(|m| m.role()).collect();
        assert_eq!(
            roles,
            vec![
                MessageRole::System,
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::User
            ]
        );
        assert_eq!(second[1].content(), "first");
        assert_eq!(second[3].content(), "second");
    }

    #[tokio::test]
    async fn test_empty_selection_records_nothing() {
        let f = fixture(MockBehavior::Reply("ok".to_string())).await;

        let err = f
            .handler
            .handle(SendMessageCommand::new(f.thread_id, "hello", Vec::new()))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Please select at least one AI model");
        let stored = f.repo.get(f.thread_id).await.unwrap().unwrap();
        assert_eq!(stored.turns().len(), 1);
    }

    #[tokio::test]
    async fn test_all_failed_text() {
        let f = fixture(MockBehavior::Malformed).await;

        let response = f
            .handler
            .handle(SendMessageCommand::new(
                f.thread_id,
                "hello",
                models(&["Gemini", "Unknown"]),
            ))
            .await
            .unwrap();

        assert_eq!(response.assistant_turn.content(), ALL_MODELS_FAILED);
        assert_eq!(response.assistant_turn.results().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_thread() {
        let f = fixture(MockBehavior::Reply("ok".to_string())).await;

        let result = f
            .handler
            .handle(SendMessageCommand::new(ThreadId::new(), "hi", models(&["GPT-4"])))
            .await;

        assert!(matches!(result, Err(ApplicationError::ThreadNotFound(_))));
        assert!(f.open_router.requests().is_empty());
        assert_eq!(f.locks.tracked().await, 0);
    }

    #[tokio::test]
    async fn test_abandoned_request_still_completes_round() {
        let f = fixture(MockBehavior::Delay(
            Duration::from_millis(200),
            "late".to_string(),
        ))
        .await;

        // 调用方在聚合进行中放弃等待
        let abandoned = tokio::time::timeout(
            Duration::from_millis(30),
            f.handler.handle(SendMessageCommand::new(
                f.thread_id,
                "hello",
                models(&["Gemini"]),
            )),
        )
        .await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(400)).await;

        let stored = f.repo.get(f.thread_id).await.unwrap().unwrap();
        let kinds: Vec<TurnKind> = stored.turns().iter().map(|t| t.kind()).collect();
        assert_eq!(
            kinds,
            vec![TurnKind::Welcome, TurnKind::User, TurnKind::Assistant]
        );
        assert_eq!(stored.turns()[2].content(), "Gemini: late");
    }

    #[test]
    fn test_render_assistant_text() {
        let text = SendMessageHandler::render_assistant_text(&[
            ModelResult::success("GPT-4", "a"),
            ModelResult::unsupported("X"),
            ModelResult::success("Claude", "b"),
        ]);
        assert_eq!(text, "GPT-4: a\n\nClaude: b");
    }
}
