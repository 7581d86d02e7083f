use tokio::sync::broadcast;

use crate::modules::chat::{ChatDomainEvent, EventPublisher};

/// 进程内事件总线
///
/// 没有订阅者时事件直接丢弃
pub struct EventBus {
    sender: broadcast::Sender<ChatDomainEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatDomainEvent> {
        self.sender.subscribe()
    }
}

impl EventPublisher for EventBus {
    fn publish(&self, event: ChatDomainEvent) {
        tracing::debug!(
            event = event.event_type(),
            thread_id = %event.thread_id(),
            "[EventBus] Publishing event"
        );
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::chat::ThreadId;

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let id = ThreadId::new();

        bus.publish(ChatDomainEvent::thread_created(id, "New Chat"));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type(), "thread.created");
        assert_eq!(event.thread_id(), id);
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let bus = EventBus::new();
        bus.publish(ChatDomainEvent::active_thread_changed(ThreadId::new()));
    }
}
