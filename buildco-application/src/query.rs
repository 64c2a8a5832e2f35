use std::time::Duration;

use serde::Serialize;

use crate::dto::Dto;
use crate::envelope::QueryEnvelope;

/// 缓存策略：作为查询类型的静态属性声明，避免按名称查表
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// 使用全局默认 TTL
    Default,
    /// 指定 TTL（秒）
    Ttl(u64),
    /// 不缓存（会话级或实时数据），读写路径均绕过缓存
    Disabled,
}

impl CachePolicy {
    /// 计算实际 TTL；`None` 表示不缓存
    pub fn ttl(&self, default: Duration) -> Option<Duration> {
        match self {
            Self::Default => Some(default),
            Self::Ttl(secs) => Some(Duration::from_secs(*secs)),
            Self::Disabled => None,
        }
    }
}

/// 应用层查询（Query）
///
/// 表达只读意图，不改变领域状态。
/// - 结果返回 [`Dto`](crate::dto::Dto)；
/// - 查询自身字段通过 `Serialize` 参与缓存键；信封中的 id/时间戳不参与；
/// - 通常使用 `#[query(name = "...", output = ...)]` 宏生成实现。
pub trait Query: Serialize + Send + Sync + 'static {
    /// 查询的稳定名称（建议常量字符串，不随重构变化）
    const NAME: &'static str;

    /// 缓存策略
    const CACHE: CachePolicy = CachePolicy::Default;

    /// 查询返回的数据传输对象
    type Output: Dto;

    fn envelope(&self) -> &QueryEnvelope;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_resolution() {
        let default = Duration::from_secs(300);
        assert_eq!(CachePolicy::Default.ttl(default), Some(default));
        assert_eq!(CachePolicy::Ttl(60).ttl(default), Some(Duration::from_secs(60)));
        assert_eq!(CachePolicy::Disabled.ttl(default), None);
    }
}
