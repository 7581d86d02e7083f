use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entities::TurnKind;
use super::value_objects::{ThreadId, TurnId};

/// 领域事件基础 trait
pub trait DomainEvent: Clone + Send + Sync {
    fn event_type(&self) -> &'static str;
    fn timestamp(&self) -> DateTime<Utc>;
}

/// 线程创建事件
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadCreatedEvent {
    pub thread_id: ThreadId,
    pub title: String,
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent for ThreadCreatedEvent {
    fn event_type(&self) -> &'static str {
        "thread.created"
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// 轮次追加事件
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnAppendedEvent {
    pub thread_id: ThreadId,
    pub turn_id: TurnId,
    pub kind: TurnKind,
    pub result_count: usize,
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent for TurnAppendedEvent {
    fn event_type(&self) -> &'static str {
        "turn.appended"
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// 线程重命名事件（手动或自动）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadRenamedEvent {
    pub thread_id: ThreadId,
    pub title: String,
    pub manual: bool,
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent for ThreadRenamedEvent {
    fn event_type(&self) -> &'static str {
        "thread.renamed"
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// 当前活动线程切换事件
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveThreadChangedEvent {
    pub thread_id: ThreadId,
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent for ActiveThreadChangedEvent {
    fn event_type(&self) -> &'static str {
        "thread.activated"
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// 聊天领域事件枚举
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ChatDomainEvent {
    ThreadCreated(ThreadCreatedEvent),
    TurnAppended(TurnAppendedEvent),
    ThreadRenamed(ThreadRenamedEvent),
    ActiveThreadChanged(ActiveThreadChangedEvent),
}

impl ChatDomainEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            ChatDomainEvent::ThreadCreated(e) => e.event_type(),
            ChatDomainEvent::TurnAppended(e) => e.event_type(),
            ChatDomainEvent::ThreadRenamed(e) => e.event_type(),
            ChatDomainEvent::ActiveThreadChanged(e) => e.event_type(),
        }
    }

    pub fn thread_id(&self) -> ThreadId {
        match self {
            ChatDomainEvent::ThreadCreated(e) => e.thread_id,
            ChatDomainEvent::TurnAppended(e) => e.thread_id,
            ChatDomainEvent::ThreadRenamed(e) => e.thread_id,
            ChatDomainEvent::ActiveThreadChanged(e) => e.thread_id,
        }
    }

    pub fn thread_created(thread_id: ThreadId, title: impl Into<String>) -> Self {
        ChatDomainEvent::ThreadCreated(ThreadCreatedEvent {
            thread_id,
            title: title.into(),
            timestamp: Utc::now(),
        })
    }

    pub fn turn_appended(
        thread_id: ThreadId,
        turn_id: TurnId,
        kind: TurnKind,
        result_count: usize,
    ) -> Self {
        ChatDomainEvent::TurnAppended(TurnAppendedEvent {
            thread_id,
            turn_id,
            kind,
            result_count,
            timestamp: Utc::now(),
        })
    }

    pub fn thread_renamed(thread_id: ThreadId, title: impl Into<String>, manual: bool) -> Self {
        ChatDomainEvent::ThreadRenamed(ThreadRenamedEvent {
            thread_id,
            title: title.into(),
            manual,
            timestamp: Utc::now(),
        })
    }

    pub fn active_thread_changed(thread_id: ThreadId) -> Self {
        ChatDomainEvent::ActiveThreadChanged(ActiveThreadChangedEvent {
            thread_id,
            timestamp: Utc::now(),
        })
    }
}
