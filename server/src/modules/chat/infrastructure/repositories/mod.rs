// Chat Infrastructure - Repositories
//
// 仓储实现：
// - InMemoryThreadRepository: 进程内存储，重启后清空

mod in_memory_thread_repository;

pub use in_memory_thread_repository::*;
