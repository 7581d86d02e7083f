// Config Value Objects
//
// 配置相关的值对象定义

use serde::{Deserialize, Serialize};

use crate::shared::ApiKey;

/// 单个提供商的接入点
///
/// 密钥不参与序列化
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderEndpoint {
    pub base_url: String,
    #[serde(skip)]
    pub api_key: Option<ApiKey>,
}

impl ProviderEndpoint {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

/// 部分接入点配置
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialProviderEndpoint {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

impl PartialProviderEndpoint {
    pub fn is_empty(&self) -> bool {
        self.base_url.is_none() && self.api_key.is_none()
    }
}

impl ProviderEndpoint {
    /// 合并部分配置，空白密钥视为未配置
    pub fn merge(&mut self, partial: PartialProviderEndpoint) {
        if let Some(base_url) = partial.base_url {
            self.base_url = base_url;
        }
        if let Some(api_key) = partial.api_key {
            self.api_key = ApiKey::new(api_key);
        }
    }
}
