use crate::modules::chat::domain::ChatDomainEvent;

/// 领域事件发布端口
///
/// 发布失败（无订阅者等）不影响业务流程
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: ChatDomainEvent);
}
