use async_trait::async_trait;

use crate::{error::AppResult, query::Query, result::ExecutionResult};

/// 查询总线（Query Bus）
///
/// - 负责根据查询的类型名称路由到对应的处理器；
/// - 适用于进程内或跨进程的查询调度；
/// - 对外返回与查询关联的 DTO 类型。
#[async_trait]
pub trait QueryBus: Send + Sync {
    /// 分发查询到对应处理器，返回该查询的 DTO
    async fn dispatch<Q>(&self, q: Q) -> AppResult<ExecutionResult<Q::Output>>
    where
        Q: Query;

    /// 边界层入口：错误被转换为 `success = false` 的结果
    async fn execute<Q>(&self, q: Q) -> ExecutionResult<Q::Output>
    where
        Q: Query,
    {
        let source_id = q.envelope().id();
        match self.dispatch(q).await {
            Ok(result) => result,
            Err(err) => ExecutionResult::from_error(source_id, &err),
        }
    }
}
