// Chat Domain Layer
// 领域层包含业务实体、值对象、领域服务和领域事件

pub mod entities;
pub mod events;
pub mod services;
pub mod value_objects;

// 重导出常用类型
pub use entities::{
    activity_label, ChatMessage, ChatThread, ChatTurn, MessageRole, ModelResult, ThreadState,
    TitleSource, TurnKind, DEFAULT_THREAD_TITLE, MISSING_API_KEY, MODEL_NOT_SUPPORTED,
    SYSTEM_MODEL_LABEL,
};
pub use events::*;
pub use services::{ContextBuilder, TitleClassifier, TitleRule, TITLE_RULES};
pub use value_objects::{ThreadId, TurnId};
