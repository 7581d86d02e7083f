// Chat Domain - Entities
// 实体通过唯一标识符来识别

mod message;
mod model_result;
mod thread;
mod turn;

pub use message::*;
pub use model_result::*;
pub use thread::*;
pub use turn::*;
