// Chat Commands - 命令定义和处理器

mod append_assistant_turn;
mod append_user_turn;
mod create_thread;
mod rename_thread;
mod send_message;
mod switch_thread;

pub use append_assistant_turn::*;
pub use append_user_turn::*;
pub use create_thread::*;
pub use rename_thread::*;
pub use send_message::*;
pub use switch_thread::*;
