use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::value_objects::ThreadId;
use super::{ChatTurn, ModelResult, TurnKind};

/// 新线程的默认标题
pub const DEFAULT_THREAD_TITLE: &str = "New Chat";

/// 线程状态
///
/// 新建时只有欢迎轮次（Empty），出现第一条用户消息后进入 Active，不再回退
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadState {
    Empty,
    Active,
}

/// 标题来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleSource {
    Default,
    Heuristic,
    Manual,
}

/// 会话线程实体 - 聚合根
///
/// 持有按插入顺序排列的轮次
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatThread {
    id: ThreadId,
    title: String,
    title_source: TitleSource,
    turns: Vec<ChatTurn>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ChatThread {
    /// 创建新线程，并写入一条欢迎轮次
    pub fn new(welcome_message: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ThreadId::new(),
            title: DEFAULT_THREAD_TITLE.to_string(),
            title_source: TitleSource::Default,
            turns: vec![ChatTurn::welcome(welcome_message)],
            created_at: now,
            updated_at: now,
        }
    }

    // Getters
    pub fn id(&self) -> ThreadId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn title_source(&self) -> TitleSource {
        self.title_source
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn state(&self) -> ThreadState {
        if self.turns.iter().any(ChatTurn::is_user) {
            ThreadState::Active
        } else {
            ThreadState::Empty
        }
    }

    pub fn user_turn_count(&self) -> usize {
        self.turns.iter().filter(|t| t.is_user()).count()
    }

    pub fn last_turn(&self) -> Option<&ChatTurn> {
        self.turns.last()
    }

    /// 可以进入模型上下文的轮次（排除欢迎语）
    pub fn conversation_turns(&self) -> impl Iterator<Item = &ChatTurn> {
        self.turns.iter().filter(|t| t.kind() != TurnKind::Welcome)
    }

    // 业务方法

    /// 追加用户轮次
    pub fn append_user_turn(&mut self, text: impl Into<String>) -> &ChatTurn {
        self.push(ChatTurn::user(text))
    }

    /// 追加助手轮次
    pub fn append_assistant_turn(
        &mut self,
        text: impl Into<String>,
        results: Vec<ModelResult>,
    ) -> &ChatTurn {
        self.push(ChatTurn::assistant(text, results))
    }

    /// 手动重命名，之后不再被自动标题覆盖
    pub fn rename(&mut self, new_title: impl Into<String>) {
        self.title = new_title.into();
        self.title_source = TitleSource::Manual;
        self.touch();
    }

    /// 应用自动生成的标题
    ///
    /// 只在第一条用户消息之后生效，手动命名过的线程保持不变。返回是否实际修改
    pub fn apply_suggested_title(&mut self, title: impl Into<String>) -> bool {
        if self.title_source == TitleSource::Manual || self.user_turn_count() != 1 {
            return false;
        }
        self.title = title.into();
        self.title_source = TitleSource::Heuristic;
        self.touch();
        true
    }

    /// 侧边栏显示的最近活动描述
    pub fn last_activity_label(&self, now: DateTime<Utc>) -> String {
        activity_label(self.updated_at, now)
    }

    fn push(&mut self, turn: ChatTurn) -> &ChatTurn {
        self.turns.push(turn);
        self.touch();
        &self.turns[self.turns.len() - 1]
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// 将时间差格式化为 "Just now" / "N minutes ago" 等
pub fn activity_label(last_activity: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(last_activity);
    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        plural(minutes, "minute")
    } else if elapsed.num_hours() < 24 {
        plural(elapsed.num_hours(), "hour")
    } else {
        plural(elapsed.num_days(), "day")
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_thread_is_empty_with_welcome() {
        let thread = ChatThread::new("Welcome!");
        assert_eq!(thread.state(), ThreadState::Empty);
        assert_eq!(thread.title(), DEFAULT_THREAD_TITLE);
        assert_eq!(thread.turns().len(), 1);
        assert_eq!(thread.turns()[0].kind(), TurnKind::Welcome);
        assert_eq!(thread.conversation_turns().count(), 0);
    }

    #[test]
    fn test_user_turn_activates_thread() {
        let mut thread = ChatThread::new("Welcome!");
        thread.append_user_turn("Hi");
        assert_eq!(thread.state(), ThreadState::Active);
        assert_eq!(thread.user_turn_count(), 1);
    }

    #[test]
    fn test_turns_keep_insertion_order() {
        let mut thread = ChatThread::new("Welcome!");
        thread.append_user_turn("question");
        thread.append_assistant_turn(
            "answer",
            vec![
                ModelResult::success("GPT-4", "a"),
                ModelResult::success("Gemini", "b"),
            ],
        );

        let kinds: Vec<TurnKind> = thread.turns().iter().map(|t| t.kind()).collect();
        assert_eq!(
            kinds,
            vec![TurnKind::Welcome, TurnKind::User, TurnKind::Assistant]
        );
        assert_eq!(thread.last_turn().unwrap().results().len(), 2);
    }

    #[test]
    fn test_suggested_title_only_on_first_user_turn() {
        let mut thread = ChatThread::new("Welcome!");
        assert!(!thread.apply_suggested_title("Too Early"));

        thread.append_user_turn("python help");
        assert!(thread.apply_suggested_title("Code Discussion"));
        assert_eq!(thread.title_source(), TitleSource::Heuristic);

        thread.append_user_turn("second question");
        assert!(!thread.apply_suggested_title("Other"));
        assert_eq!(thread.title(), "Code Discussion");
    }

    #[test]
    fn test_manual_title_wins_over_heuristic() {
        let mut thread = ChatThread::new("Welcome!");
        thread.rename("My Thread");
        thread.append_user_turn("python help");

        assert!(!thread.apply_suggested_title("Code Discussion"));
        assert_eq!(thread.title(), "My Thread");
        assert_eq!(thread.title_source(), TitleSource::Manual);
    }

    #[test]
    fn test_activity_label() {
        let now = Utc::now();
        assert_eq!(activity_label(now, now), "Just now");
        assert_eq!(activity_label(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(activity_label(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(activity_label(now - Duration::hours(3), now), "3 hours ago");
        assert_eq!(activity_label(now - Duration::days(2), now), "2 days ago");
        assert_eq!(activity_label(now + Duration::minutes(5), now), "Just now");
    }
}
