// Chat Queries - 查询定义和处理器

mod get_active_thread;
mod get_thread;
mod list_threads;
mod views;

pub use get_active_thread::*;
pub use get_thread::*;
pub use list_threads::*;
pub use views::*;
