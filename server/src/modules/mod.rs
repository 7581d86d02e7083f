// Modules Layer - 业务模块
//
// 按照六边形架构组织的业务模块：
// - chat: 聊天模块，处理线程、轮次和多模型调用
// - config: 配置模块，处理启动配置

pub mod chat;
pub mod config;

pub use chat::ChatModule;
pub use config::ConfigModule;
