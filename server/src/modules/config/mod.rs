// Config Module
//
// 配置管理模块，采用六边形架构
//
// 层次结构:
// - domain: 领域层，包含配置实体和值对象
// - ports: 端口层，定义配置来源的抽象接口
// - infrastructure: 基础设施层，实现环境变量和内存来源

pub mod domain;
pub mod infrastructure;
pub mod ports;

// 重新导出常用类型

// Domain
pub use domain::{
    AppConfig, AppInfoConfig, LLMConfig, PartialAppConfig, PartialAppInfoConfig,
    PartialLLMConfig, PartialProviderEndpoint, PartialProvidersConfig, PartialServerConfig,
    ProviderEndpoint, ProvidersConfig, ServerConfig,
};

// Ports
pub use ports::{ConfigError, ConfigSource};

// Infrastructure
pub use infrastructure::{EnvConfigSource, InMemoryConfigSource};

use tracing::info;

/// Config 模块容器
pub struct ConfigModule;

impl ConfigModule {
    /// 在默认配置之上合并来源并校验
    pub fn load(source: &dyn ConfigSource) -> Result<AppConfig, ConfigError> {
        let mut config = AppConfig::default();
        config.merge(source.load()?);
        config.validate().map_err(ConfigError::Validation)?;

        info!(
            bind_addr = %config.server.bind_addr,
            timeout_secs = config.llm.request_timeout_secs,
            max_retries = config.llm.retry.max_retries,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// 从进程环境加载
    pub fn from_env() -> Result<AppConfig, ConfigError> {
        Self::load(&EnvConfigSource::from_env())
    }
}
