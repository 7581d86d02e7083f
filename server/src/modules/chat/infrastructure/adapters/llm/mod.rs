// LLM Adapters
// 各种 LLM 提供商的适配器实现

mod base;
mod claude;
mod gemini;
#[cfg(test)]
mod mock;
mod openrouter;
mod registry;

pub use claude::*;
pub use gemini::*;
#[cfg(test)]
pub use mock::*;
pub use openrouter::*;
pub use registry::*;
