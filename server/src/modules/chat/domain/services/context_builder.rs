use super::super::entities::{ChatMessage, ChatTurn};

/// 上下文构建器
///
/// 领域服务：把线程历史整理为发送给各模型的统一对话
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    /// 最大历史消息数
    max_messages: usize,
    /// 系统提示词
    system_prompt: Option<String>,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextBuilder {
    /// 创建上下文构建器（默认最大 50 条消息）
    pub fn new() -> Self {
        Self {
            max_messages: 50,
            system_prompt: None,
        }
    }

    /// 创建指定最大消息数的上下文构建器
    pub fn with_max_messages(max_messages: usize) -> Self {
        Self {
            max_messages,
            system_prompt: None,
        }
    }

    /// 设置系统提示词
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        self.system_prompt = if prompt.trim().is_empty() {
            None
        } else {
            Some(prompt)
        };
        self
    }

    /// 构建上下文消息列表
    ///
    /// 返回顺序：
    /// 1. 系统提示词（如果有）
    /// 2. 最近的 N 条历史消息（欢迎语不计入）
    /// 3. 当前用户消息
    pub fn build<'a, I>(&self, history: I, current_message: &str) -> Vec<ChatMessage>
    where
        I: IntoIterator<Item = &'a ChatTurn>,
    {
        let history: Vec<&ChatTurn> = history.into_iter().collect();
        let mut context = Vec::with_capacity(history.len().min(self.max_messages) + 2);

        if let Some(ref prompt) = self.system_prompt {
            context.push(ChatMessage::system(prompt.clone()));
        }

        let start = history.len().saturating_sub(self.max_messages);
        for turn in &history[start..] {
            context.push(turn.message().clone());
        }

        context.push(ChatMessage::user(current_message));

        context
    }
}
