// Chat Module - 聊天模块
//
// 实现六边形架构（Hexagonal Architecture）：
// - domain: 领域层，包含实体、值对象、领域服务和领域事件
// - ports: 端口层，定义与外部世界的抽象接口
// - infrastructure: 基础设施层，实现端口的具体适配器
// - application: 应用层，实现 CQRS 命令和查询处理器

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

// 重新导出常用类型
pub use application::{
    // Traits
    ApplicationError,
    CommandHandler,
    QueryHandler,
    // Aggregation
    validate_selection,
    ResponseAggregator,
    EMPTY_SELECTION_MESSAGE,
    // Commands
    AppendAssistantTurnCommand,
    AppendAssistantTurnHandler,
    AppendAssistantTurnResponse,
    AppendUserTurnCommand,
    AppendUserTurnHandler,
    AppendUserTurnResponse,
    CreateThreadCommand,
    CreateThreadHandler,
    CreateThreadResponse,
    RenameThreadCommand,
    RenameThreadHandler,
    RenameThreadResponse,
    SendMessageCommand,
    SendMessageHandler,
    SendMessageResponse,
    SwitchThreadCommand,
    SwitchThreadHandler,
    SwitchThreadResponse,
    // Queries
    GetActiveThreadHandler,
    GetActiveThreadQuery,
    GetActiveThreadResponse,
    GetThreadHandler,
    GetThreadQuery,
    GetThreadResponse,
    ListThreadsHandler,
    ListThreadsQuery,
    ListThreadsResponse,
    ThreadSummary,
    ThreadView,
    // State
    ActiveThread,
    ThreadLocks,
};

pub use domain::{
    ChatDomainEvent, ChatMessage, ChatThread, ChatTurn, ContextBuilder, MessageRole, ModelResult,
    ThreadId, TurnKind,
};

pub use infrastructure::{GenerationParams, InMemoryThreadRepository, ModelRegistry};

pub use ports::{
    EventPublisher, LLMError, LLMPort, LLMProviderConfig, ModelInfo, ModelInvoker, ProviderType,
    RepositoryError, ThreadRepository,
};

use std::sync::Arc;

/// 聊天模块设置
#[derive(Debug, Clone)]
pub struct ChatSettings {
    /// 新线程的欢迎语
    pub welcome_message: String,
    /// 发送给每个模型的系统提示词
    pub system_prompt: Option<String>,
    /// 进入上下文的历史消息上限
    pub context_length: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            welcome_message: "Welcome! Ask me anything and I'll respond using multiple AI models simultaneously."
                .to_string(),
            system_prompt: None,
            context_length: 50,
        }
    }
}

/// Chat 模块容器
///
/// 管理模块内的依赖注入
pub struct ChatModule {
    // Repositories
    thread_repository: Arc<dyn ThreadRepository>,
    // LLM
    aggregator: ResponseAggregator,
    // State
    active_thread: Arc<ActiveThread>,
    // Handlers
    create_thread_handler: CreateThreadHandler,
    append_user_turn_handler: Arc<AppendUserTurnHandler>,
    append_assistant_turn_handler: Arc<AppendAssistantTurnHandler>,
    rename_thread_handler: RenameThreadHandler,
    switch_thread_handler: SwitchThreadHandler,
    send_message_handler: SendMessageHandler,
    get_thread_handler: GetThreadHandler,
    list_threads_handler: ListThreadsHandler,
    get_active_thread_handler: GetActiveThreadHandler,
}

impl ChatModule {
    /// 创建新的 ChatModule 实例（内存存储）
    pub fn new(
        invoker: Arc<dyn ModelInvoker>,
        events: Arc<dyn EventPublisher>,
        settings: ChatSettings,
    ) -> Self {
        let thread_repository: Arc<dyn ThreadRepository> =
            Arc::new(InMemoryThreadRepository::new());
        Self::with_repository(thread_repository, invoker, events, settings)
    }

    /// 使用自定义仓储创建 ChatModule
    pub fn with_repository(
        thread_repository: Arc<dyn ThreadRepository>,
        invoker: Arc<dyn ModelInvoker>,
        events: Arc<dyn EventPublisher>,
        settings: ChatSettings,
    ) -> Self {
        let locks = Arc::new(ThreadLocks::new());
        let active_thread = Arc::new(ActiveThread::new());
        let aggregator = ResponseAggregator::new(invoker);

        let mut context_builder = ContextBuilder::with_max_messages(settings.context_length);
        if let Some(prompt) = settings.system_prompt {
            context_builder = context_builder.with_system_prompt(prompt);
        }

        let create_thread_handler = CreateThreadHandler::new(
            thread_repository.clone(),
            active_thread.clone(),
            events.clone(),
            settings.welcome_message,
        );
        let append_user_turn_handler = Arc::new(AppendUserTurnHandler::new(
            thread_repository.clone(),
            locks.clone(),
            events.clone(),
        ));
        let append_assistant_turn_handler = Arc::new(AppendAssistantTurnHandler::new(
            thread_repository.clone(),
            locks.clone(),
            events.clone(),
        ));
        let rename_thread_handler =
            RenameThreadHandler::new(thread_repository.clone(), events.clone());
        let switch_thread_handler =
            SwitchThreadHandler::new(thread_repository.clone(), active_thread.clone(), events);
        let send_message_handler = SendMessageHandler::new(
            thread_repository.clone(),
            locks,
            aggregator.clone(),
            context_builder,
            append_user_turn_handler.clone(),
            append_assistant_turn_handler.clone(),
        );
        let get_thread_handler = GetThreadHandler::new(thread_repository.clone());
        let list_threads_handler = ListThreadsHandler::new(thread_repository.clone());
        let get_active_thread_handler =
            GetActiveThreadHandler::new(thread_repository.clone(), active_thread.clone());

        Self {
            thread_repository,
            aggregator,
            active_thread,
            create_thread_handler,
            append_user_turn_handler,
            append_assistant_turn_handler,
            rename_thread_handler,
            switch_thread_handler,
            send_message_handler,
            get_thread_handler,
            list_threads_handler,
            get_active_thread_handler,
        }
    }

    // Command handlers

    /// 创建线程并设为活动线程
    pub async fn create_thread(&self) -> Result<CreateThreadResponse, ApplicationError> {
        self.create_thread_handler.handle(CreateThreadCommand).await
    }

    /// 追加用户轮次
    pub async fn append_user_turn(
        &self,
        command: AppendUserTurnCommand,
    ) -> Result<AppendUserTurnResponse, ApplicationError> {
        self.append_user_turn_handler.handle(command).await
    }

    /// 追加助手轮次
    pub async fn append_assistant_turn(
        &self,
        command: AppendAssistantTurnCommand,
    ) -> Result<AppendAssistantTurnResponse, ApplicationError> {
        self.append_assistant_turn_handler.handle(command).await
    }

    /// 手动重命名
    pub async fn rename_thread(
        &self,
        command: RenameThreadCommand,
    ) -> Result<RenameThreadResponse, ApplicationError> {
        self.rename_thread_handler.handle(command).await
    }

    /// 切换活动线程
    pub async fn switch_thread(
        &self,
        command: SwitchThreadCommand,
    ) -> Result<SwitchThreadResponse, ApplicationError> {
        self.switch_thread_handler.handle(command).await
    }

    /// 发送消息并记录完整的一轮
    pub async fn send_message(
        &self,
        command: SendMessageCommand,
    ) -> Result<SendMessageResponse, ApplicationError> {
        self.send_message_handler.handle(command).await
    }

    /// 无状态聚合调用
    pub async fn aggregate(
        &self,
        selected_models: &[String],
        conversation: &[ChatMessage],
    ) -> Result<Vec<ModelResult>, ApplicationError> {
        validate_selection(selected_models)?;
        Ok(self.aggregator.aggregate(selected_models, conversation).await)
    }

    // Query handlers

    /// 获取线程
    pub async fn get_thread(
        &self,
        query: GetThreadQuery,
    ) -> Result<GetThreadResponse, ApplicationError> {
        self.get_thread_handler.handle(query).await
    }

    /// 列出所有线程
    pub async fn list_threads(
        &self,
        query: ListThreadsQuery,
    ) -> Result<ListThreadsResponse, ApplicationError> {
        self.list_threads_handler.handle(query).await
    }

    /// 获取当前活动线程
    pub async fn active_thread(&self) -> Result<GetActiveThreadResponse, ApplicationError> {
        self.get_active_thread_handler
            .handle(GetActiveThreadQuery)
            .await
    }

    /// 可用模型列表
    pub fn list_models(&self) -> Vec<ModelInfo> {
        self.aggregator.invoker().list_models()
    }

    // Accessors

    /// 获取线程仓储
    pub fn thread_repository(&self) -> &Arc<dyn ThreadRepository> {
        &self.thread_repository
    }

    /// 获取活动线程状态
    pub fn active_thread_state(&self) -> &Arc<ActiveThread> {
        &self.active_thread
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::EventBus;
    use crate::modules::chat::infrastructure::adapters::llm::MockLLMAdapter;

    fn module() -> ChatModule {
        let mut registry = ModelRegistry::new(GenerationParams::default());
        registry.register_adapter(Arc::new(MockLLMAdapter::replying(
            ProviderType::OpenRouter,
            "pong",
        )));
        registry.add_route("GPT-4", ProviderType::OpenRouter, "openai/gpt-3.5-turbo");
        ChatModule::new(
            Arc::new(registry),
            Arc::new(EventBus::new()),
            ChatSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_chat_module_integration() {
        let module = module();

        // 创建线程
        let created = module.create_thread().await.unwrap().thread;
        let active = module.active_thread().await.unwrap().thread.unwrap();
        assert_eq!(active.id(), created.id());

        // 发送消息
        let sent = module
            .send_message(SendMessageCommand::new(
                created.id(),
                "Explain recursion",
                vec!["GPT-4".to_string(), "Nope".to_string()],
            ))
            .await
            .unwrap();
        assert_eq!(sent.assistant_turn.results().len(), 2);
        assert_eq!(sent.thread.title(), "Learning & Education");

        // 手动重命名
        module
            .rename_thread(RenameThreadCommand::new(created.id(), "Recursion"))
            .await
            .unwrap();

        // 新线程成为活动线程，切换回来
        let second = module.create_thread().await.unwrap().thread;
        assert_eq!(
            module.active_thread().await.unwrap().thread.unwrap().id(),
            second.id()
        );
        module
            .switch_thread(SwitchThreadCommand::new(created.id()))
            .await
            .unwrap();

        let list = module.list_threads(ListThreadsQuery::default()).await.unwrap();
        assert_eq!(list.total, 2);
        assert_eq!(list.threads[0].id, second.id());

        let fetched = module
            .get_thread(GetThreadQuery::new(created.id()))
            .await
            .unwrap()
            .thread
            .unwrap();
        assert_eq!(fetched.title(), "Recursion");
        assert_eq!(fetched.turns().len(), 3);
    }

    #[tokio::test]
    async fn test_stateless_aggregate_validates_selection() {
        let module = module();

        let err = module
            .aggregate(&[], &[ChatMessage::user("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::ValidationError(_)));

        let results = module
            .aggregate(&["GPT-4".to_string()], &[ChatMessage::user("hi")])
            .await
            .unwrap();
        assert_eq!(results, vec![ModelResult::success("GPT-4", "pong")]);
    }
}
