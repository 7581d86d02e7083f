// Chat Domain - Value Objects
// 值对象是不可变的，通过值而非标识来比较

mod thread_id;
mod turn_id;

pub use thread_id::*;
pub use turn_id::*;
