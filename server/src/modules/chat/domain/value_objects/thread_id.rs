use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// 会话线程唯一标识符
///
/// 基于 UUIDv7，按创建时间单调递增，可直接用于排序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(Uuid);

impl ThreadId {
    /// 生成新的线程 ID
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// 从字符串解析
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// 获取内部 UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ThreadId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ThreadId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<ThreadId> for Uuid {
    fn from(id: ThreadId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_ids_are_monotonic() {
        let ids: Vec<ThreadId> = (0..64).map(|_| ThreadId::new()).collect();
        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_thread_id_parse() {
        let uuid_str = "018f3a52-7c1e-7b3a-9a2f-5e8b1c0d4e6f";
        let id = ThreadId::parse(uuid_str).unwrap();
        assert_eq!(id.to_string(), uuid_str);
    }

    #[test]
    fn test_thread_id_parse_invalid() {
        assert!(ThreadId::parse("not-a-uuid").is_err());
    }
}
