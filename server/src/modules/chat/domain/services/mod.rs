// Chat Domain - Services
// 领域服务处理不属于任何实体的业务逻辑

mod context_builder;
mod title_classifier;

pub use context_builder::*;
pub use title_classifier::*;
