use async_trait::async_trait;

use crate::{command::Command, error::AppResult, result::ExecutionResult};

/// 命令总线（Command Bus）
///
/// - 负责根据命令的类型名称路由到对应的处理器；
/// - 框架可提供不同实现（如进程内、消息队列等）；
/// - 该 trait 带有泛型方法，通常以具体实现类型注入使用。
#[async_trait]
pub trait CommandBus: Send + Sync {
    /// 分发命令到对应处理器，失败以 `AppError` 返回
    async fn dispatch<C>(&self, cmd: C) -> AppResult<ExecutionResult<C::Output>>
    where
        C: Command;

    /// 边界层入口：错误被转换为 `success = false` 的结果
    async fn execute<C>(&self, cmd: C) -> ExecutionResult<C::Output>
    where
        C: Command,
    {
        let source_id = cmd.envelope().id();
        match self.dispatch(cmd).await {
            Ok(result) => result,
            Err(err) => ExecutionResult::from_error(source_id, &err),
        }
    }
}
