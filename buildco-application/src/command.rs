use crate::envelope::CommandEnvelope;

/// 应用层命令（Command）
///
/// 表达"意图"的写操作请求，通常会修改领域状态。
/// - 与 [`Query`](crate::query::Query) 相对，`Command` 应避免读写混用。
/// - 建议保持语义化的"动宾结构"命名，如 `SubmitQuoteRequest`、`UpdateQuoteStatus`。
/// - 通常使用 `#[command(name = "...")]` 宏生成实现。
///
/// 关联常量：
/// - `NAME`：命令的稳定名称，用于注册、路由、日志与指标。避免依赖 `type_name::<T>()`。
/// - `INVALIDATES`：命令成功后需要失效缓存的查询名称列表。
pub trait Command: Send + Sync + 'static {
    /// 命令的稳定名称（建议常量字符串，不随重构变化）
    const NAME: &'static str;

    /// 成功后需要失效的查询（`Query::NAME`）
    const INVALIDATES: &'static [&'static str] = &[];

    /// 处理器返回值，例如新建实体的 id
    type Output: Send + Sync + 'static;

    fn envelope(&self) -> &CommandEnvelope;
}
