// In-Memory Config Source
//
// 内存配置来源，用于测试

use crate::modules::config::domain::PartialAppConfig;
use crate::modules::config::ports::{ConfigError, ConfigSource};

#[derive(Debug, Clone, Default)]
pub struct InMemoryConfigSource {
    partial: PartialAppConfig,
}

impl InMemoryConfigSource {
    pub fn new(partial: PartialAppConfig) -> Self {
        Self { partial }
    }
}

impl ConfigSource for InMemoryConfigSource {
    fn load(&self) -> Result<PartialAppConfig, ConfigError> {
        Ok(self.partial.clone())
    }
}
