//! 进程内协作方实现：开发与测试使用，不做持久化
//!
mod email;
mod file_storage;
mod repository;

pub use email::InMemoryEmailSender;
pub use file_storage::InMemoryFileStorage;
pub use repository::InMemoryRepository;
