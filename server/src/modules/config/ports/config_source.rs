// Config Source Port
//
// 配置来源端口定义

use thiserror::Error;

use crate::modules::config::domain::PartialAppConfig;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    Invalid { key: String, message: String },

    #[error("Validation error: {}", .0.join("; "))]
    Validation(Vec<String>),
}

impl ConfigError {
    pub fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// 配置来源
///
/// 返回部分配置，未出现的字段保留默认值
pub trait ConfigSource: Send + Sync {
    fn load(&self) -> Result<PartialAppConfig, ConfigError>;
}
