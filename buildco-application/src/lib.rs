pub mod cache;
pub mod command;
pub mod command_bus;
pub mod command_dispatcher;
pub mod command_handler;
pub mod config;
pub mod dto;
pub mod envelope;
pub mod error;
pub mod middleware;
pub mod query;
pub mod query_bus;
pub mod query_dispatcher;
pub mod query_handler;
pub mod registry;
pub mod result;
pub mod telemetry;
pub mod validation;

pub use cache::{InMemoryQueryCache, QueryCache};
pub use command_dispatcher::CommandDispatcher;
pub use config::DispatcherConfig;
pub use error::{AppError, AppResult};
pub use query_dispatcher::QueryDispatcher;
pub use result::ExecutionResult;
