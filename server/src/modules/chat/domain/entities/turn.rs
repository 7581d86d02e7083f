use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::value_objects::TurnId;
use super::{ChatMessage, ModelResult};

/// 欢迎轮次的模型标签
pub const SYSTEM_MODEL_LABEL: &str = "System";

/// 轮次类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnKind {
    /// 新建线程时写入的欢迎语，不进入模型上下文
    Welcome,
    /// 用户消息
    User,
    /// 一次聚合调用的全部回复
    Assistant,
}

/// 对话轮次
///
/// 用户轮次没有结果；助手轮次携带发送时所选每个模型的结果，顺序与选择顺序一致
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    id: TurnId,
    kind: TurnKind,
    message: ChatMessage,
    models: Vec<String>,
    results: Vec<ModelResult>,
    created_at: DateTime<Utc>,
}

impl ChatTurn {
    fn new(
        kind: TurnKind,
        message: ChatMessage,
        models: Vec<String>,
        results: Vec<ModelResult>,
    ) -> Self {
        Self {
            id: TurnId::new(),
            kind,
            message,
            models,
            results,
            created_at: Utc::now(),
        }
    }

    /// 创建欢迎轮次
    pub fn welcome(text: impl Into<String>) -> Self {
        Self::new(
            TurnKind::Welcome,
            ChatMessage::assistant(text),
            vec![SYSTEM_MODEL_LABEL.to_string()],
            Vec::new(),
        )
    }

    /// 创建用户轮次
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(TurnKind::User, ChatMessage::user(text), Vec::new(), Vec::new())
    }

    /// 创建助手轮次，模型标签取自结果
    pub fn assistant(text: impl Into<String>, results: Vec<ModelResult>) -> Self {
        let models = results.iter().map(|r| r.model.clone()).collect();
        Self::new(
            TurnKind::Assistant,
            ChatMessage::assistant(text),
            models,
            results,
        )
    }

    // Getters
    pub fn id(&self) -> TurnId {
        self.id
    }

    pub fn kind(&self) -> TurnKind {
        self.kind
    }

    pub fn message(&self) -> &ChatMessage {
        &self.message
    }

    pub fn content(&self) -> &str {
        self.message.content()
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn results(&self) -> &[ModelResult] {
        &self.results
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_user(&self) -> bool {
        self.kind == TurnKind::User
    }
}
