use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::modules::chat::domain::ThreadId;

/// 按线程划分的互斥锁
///
/// 同一线程的追加操作串行执行；不同线程互不影响。
/// 表中只保留仍被持有或等待的锁
#[derive(Default)]
pub struct ThreadLocks {
    locks: Mutex<HashMap<ThreadId, Arc<Mutex<()>>>>,
}

impl ThreadLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取线程锁，守卫释放前其他调用方等待
    pub async fn acquire(&self, id: ThreadId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // 只剩表内引用的锁已无人使用
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(id).or_default().clone()
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    pub(crate) async fn tracked(&self) -> usize {
        self.locks.lock().await.len()
    }
}

/// 当前活动线程
#[derive(Default)]
pub struct ActiveThread {
    current: RwLock<Option<ThreadId>>,
}

impl ActiveThread {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> Option<ThreadId> {
        *self.current.read().await
    }

    pub async fn set(&self, id: ThreadId) {
        *self.current.write().await = Some(id);
    }
}
