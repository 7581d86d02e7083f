// Config Infrastructure Layer
//
// 配置模块的基础设施实现

pub mod env_source;
pub mod memory_source;

pub use env_source::*;
pub use memory_source::*;
