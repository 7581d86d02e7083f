use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::modules::chat::domain::{ChatThread, ThreadId, ThreadState};

/// 线程详情视图，附带派生字段
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadView {
    #[serde(flatten)]
    pub thread: ChatThread,
    pub state: ThreadState,
    pub last_activity_label: String,
}

impl ThreadView {
    pub fn new(thread: ChatThread, now: DateTime<Utc>) -> Self {
        Self {
            state: thread.state(),
            last_activity_label: thread.last_activity_label(now),
            thread,
        }
    }
}

/// 侧边栏列表项
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadSummary {
    pub id: ThreadId,
    pub title: String,
    pub state: ThreadState,
    pub turn_count: usize,
    pub last_activity_label: String,
    pub updated_at: DateTime<Utc>,
}

impl ThreadSummary {
    pub fn new(thread: &ChatThread, now: DateTime<Utc>) -> Self {
        Self {
            id: thread.id(),
            title: thread.title().to_string(),
            state: thread.state(),
            turn_count: thread.turns().len(),
            last_activity_label: thread.last_activity_label(now),
            updated_at: thread.updated_at(),
        }
    }
}
