// Infrastructure - 进程级组件

pub mod event_bus;
pub mod state;

pub use event_bus::EventBus;
pub use state::AppState;
