// Chat Ports Layer
// 端口定义了模块与外部世界的接口

mod event_publisher;
mod llm_port;
mod thread_repository;

pub use event_publisher::*;
pub use llm_port::*;
pub use thread_repository::*;
