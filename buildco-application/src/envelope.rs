//! 命令 / 查询信封（Envelope）
//!
//! 承载一次命令或查询的横切信息：唯一 id、创建时间、关联追踪 id、执行者 id 等。
//! id 与时间戳在构造时生成，调用方无法指定（builder 不提供对应 setter）。
//!
//! 查询信封另外携带“查询形状”：分页、过滤与排序，它们参与缓存键的计算，而 id 与时间戳不参与。
//!
use std::collections::BTreeMap;

use bon::Builder;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// 命令信封
///
/// ```rust
/// use buildco_application::envelope::CommandEnvelope;
///
/// let env = CommandEnvelope::builder()
///     .correlation_id("cor-1".to_string())
///     .user_id("admin-7".to_string())
///     .build();
///
/// assert_eq!(env.correlation_id(), Some("cor-1"));
/// assert_ne!(env.id(), CommandEnvelope::default().id());
/// ```
#[derive(Builder, Debug, Serialize)]
pub struct CommandEnvelope {
    #[builder(skip = Uuid::new_v4())]
    id: Uuid,
    #[builder(skip = Utc::now())]
    created_at: DateTime<Utc>,
    /// 关联 id：在因果相关的一串操作中传递
    correlation_id: Option<String>,
    /// 执行者 id
    user_id: Option<String>,
    #[builder(default)]
    metadata: BTreeMap<String, String>,
}

impl Default for CommandEnvelope {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl CommandEnvelope {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// 派生一个后续命令的信封：新的 id，沿用关联 id（缺省时以本命令 id 作为关联 id）与执行者
    pub fn follow_up(&self) -> CommandEnvelope {
        CommandEnvelope::builder()
            .correlation_id(
                self.correlation_id
                    .clone()
                    .unwrap_or_else(|| self.id.to_string()),
            )
            .maybe_user_id(self.user_id.clone())
            .build()
    }
}

/// 分页参数：`page` 从 1 开始，`limit` 大于 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Pagination {
    pub fn new(page: u32, limit: u32) -> AppResult<Self> {
        if page == 0 {
            return Err(AppError::InvalidQuery("page must be >= 1".into()));
        }
        if limit == 0 {
            return Err(AppError::InvalidQuery("limit must be > 0".into()));
        }
        Ok(Self { page, limit })
    }

    /// 第一页，指定每页条数
    pub fn first(limit: u32) -> AppResult<Self> {
        Self::new(1, limit)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// 跳过的条数；超出 `usize` 时饱和
    pub fn offset(&self) -> usize {
        let skipped_pages = usize::try_from(self.page - 1).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);
        skipped_pages.saturating_mul(limit)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// 排序：字段名 + 方向
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// 查询信封
///
/// ```rust
/// use buildco_application::envelope::{Pagination, QueryEnvelope, SortSpec};
///
/// let env = QueryEnvelope::builder()
///     .pagination(Pagination::first(5).unwrap())
///     .sort(SortSpec::desc("created_at"))
///     .build()
///     .with_filter("status", "pending");
///
/// assert_eq!(env.filter_str("status"), Some("pending"));
/// ```
#[derive(Builder, Debug, Serialize)]
pub struct QueryEnvelope {
    #[builder(skip = Uuid::new_v4())]
    id: Uuid,
    #[builder(skip = Utc::now())]
    created_at: DateTime<Utc>,
    correlation_id: Option<String>,
    user_id: Option<String>,
    pagination: Option<Pagination>,
    /// 过滤条件；具体语义由各查询定义。BTreeMap 保证键序稳定
    #[builder(default)]
    filters: BTreeMap<String, serde_json::Value>,
    sort: Option<SortSpec>,
}

impl Default for QueryEnvelope {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl QueryEnvelope {
    pub fn with_filter(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn pagination(&self) -> Option<&Pagination> {
        self.pagination.as_ref()
    }

    pub fn filters(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.filters
    }

    pub fn filter_str(&self, key: &str) -> Option<&str> {
        self.filters.get(key).and_then(|v| v.as_str())
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_envelope_gets_its_own_id() {
        let a = CommandEnvelope::default();
        let b = CommandEnvelope::default();
        assert_ne!(a.id(), b.id());

        let q1 = QueryEnvelope::default();
        let q2 = QueryEnvelope::default();
        assert_ne!(q1.id(), q2.id());
    }

    #[test]
    fn follow_up_keeps_the_causal_chain() {
        let root = CommandEnvelope::builder().user_id("u-1".to_string()).build();
        let next = root.follow_up();

        assert_ne!(next.id(), root.id());
        assert_eq!(next.correlation_id(), Some(root.id().to_string().as_str()));
        assert_eq!(next.user_id(), Some("u-1"));

        let third = next.follow_up();
        assert_eq!(third.correlation_id(), next.correlation_id());
    }

    #[test]
    fn pagination_rejects_zero() {
        assert!(matches!(Pagination::new(0, 10), Err(AppError::InvalidQuery(_))));
        assert!(matches!(Pagination::new(1, 0), Err(AppError::InvalidQuery(_))));

        let p = Pagination::new(3, 20).unwrap();
        assert_eq!(p.offset(), 40);
    }

    #[test]
    fn offset_saturates_instead_of_overflowing() {
        let p = Pagination::new(u32::MAX, u32::MAX).unwrap();
        let exact = u64::from(u32::MAX - 1) * u64::from(u32::MAX);
        assert_eq!(p.offset(), usize::try_from(exact).unwrap_or(usize::MAX));
    }
}
