//! 实体（Entity）基础抽象
//!
//! 为 Quote / JobApplication 等实体提供统一的标识能力，供仓储按 id 存取。
//!
use std::{fmt::Display, hash::Hash, str::FromStr};

/// 具备唯一标识的实体抽象
pub trait Entity: Clone + Send + Sync + 'static {
    /// 实体的稳定名称（用于错误信息与日志）
    const TYPE: &'static str;

    /// 实体标识类型，要求可解析、可显示、可哈希与可克隆
    type Id: FromStr + Clone + Display + Eq + Hash + Send + Sync + 'static;

    /// 获取实体标识
    fn id(&self) -> &Self::Id;
}
