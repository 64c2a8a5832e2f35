//! 查询缓存（QueryCache）
//!
//! 以"查询形状"为键缓存查询结果（JSON 形式），避免在 TTL 窗口内重复执行相同查询：
//! - 缓存键只由查询名称、查询自身参数、过滤、分页与排序决定，与 id/时间戳无关；
//! - 过期条目在读取时惰性淘汰；
//! - `invalidate` 支持 `*` 通配（匹配任意序列）；
//! - 每次失效都推进相关键的"代数"，查询分发以 `set_if_generation` 写回，
//!   执行期间被失效过的结果不会落入缓存。
//!
mod inmemory;

pub use inmemory::InMemoryQueryCache;

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::envelope::{Pagination, SortSpec};
use crate::error::AppResult;
use crate::query::Query;

/// 缓存键前缀
pub const KEY_PREFIX: &str = "query";

#[async_trait]
pub trait QueryCache: Send + Sync {
    /// 未设置或已过期时返回 `None`；过期条目同时被移除
    async fn get(&self, key: &str) -> Option<serde_json::Value>;

    /// 无条件覆盖写入，过期时间为 `now + ttl`
    async fn set(&self, key: &str, value: serde_json::Value, ttl: Duration);

    /// 键的当前代数；任何可能覆盖该键的 `invalidate` 或 `clear` 都会使其增长
    async fn generation(&self, key: &str) -> u64;

    /// 仅当键的代数仍等于 `generation` 时写入，返回是否写入
    ///
    /// 代数检查与写入相对 `invalidate` 是原子的。
    async fn set_if_generation(
        &self,
        key: &str,
        value: serde_json::Value,
        ttl: Duration,
        generation: u64,
    ) -> bool;

    /// 移除所有匹配 `pattern` 的条目，返回移除数量；无匹配时返回 0
    async fn invalidate(&self, pattern: &str) -> usize;

    async fn clear(&self);
}

#[derive(Serialize)]
struct QueryShape<'a> {
    params: serde_json::Value,
    filters: &'a BTreeMap<String, serde_json::Value>,
    pagination: Option<&'a Pagination>,
    sort: Option<&'a SortSpec>,
}

/// 计算查询的缓存键：`query:<NAME>:<shape-json>`
///
/// `serde_json` 的对象默认按键排序，因此参数字段与过滤条件的书写/插入顺序不影响结果。
pub fn cache_key<Q: Query>(query: &Q) -> AppResult<String> {
    let envelope = query.envelope();
    let shape = QueryShape {
        params: serde_json::to_value(query)?,
        filters: envelope.filters(),
        pagination: envelope.pagination(),
        sort: envelope.sort(),
    };

    Ok(format!(
        "{KEY_PREFIX}:{}:{}",
        Q::NAME,
        serde_json::to_string(&shape)?
    ))
}

/// 匹配某一查询类型全部缓存条目的模式
pub fn pattern_for(query_name: &str) -> String {
    format!("{KEY_PREFIX}:{query_name}:*")
}

/// 键所属的作用域，即 `query:<NAME>:` 前缀
pub(crate) fn key_scope(key: &str) -> Option<&str> {
    let first = key.find(':')?;
    let second = first + 1 + key[first + 1..].find(':')?;
    Some(&key[..=second])
}

/// 形如 `query:<NAME>:*` 的模式只影响单个作用域；其余模式返回 `None`
pub(crate) fn pattern_scope(pattern: &str) -> Option<&str> {
    let scope = pattern.strip_suffix('*')?;
    (!scope.contains('*') && key_scope(scope) == Some(scope)).then_some(scope)
}

/// 结果是否值得缓存：null、空数组、空对象不缓存
pub(crate) fn is_cacheable_value(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Array(items) => !items.is_empty(),
        serde_json::Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}

/// 简单通配匹配：`*` 匹配任意（含空）字符序列，其余字符逐一比较
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();

    let (mut pi, mut ti) = (0, 0);
    // 最近一个 `*` 之后的模式位置，以及它当前吞到的文本位置
    let mut backtrack: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && p[pi] == '*' {
            backtrack = Some((pi + 1, ti));
            pi += 1;
        } else if pi < p.len() && p[pi] == t[ti] {
            pi += 1;
            ti += 1;
        } else if let Some((after_star, consumed)) = backtrack {
            pi = after_star;
            ti = consumed + 1;
            backtrack = Some((after_star, consumed + 1));
        } else {
            return false;
        }
    }

    p[pi..].iter().all(|c| *c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wildcard_cases() {
        assert!(wildcard_match("query:GetQuoteListQuery:*", "query:GetQuoteListQuery:{}"));
        assert!(wildcard_match("*", ""));
        assert!(wildcard_match("*", "anything"));
        assert!(wildcard_match("a*c", "abbbc"));
        assert!(wildcard_match("a*b*c", "a-b-x-c"));
        assert!(wildcard_match("exact", "exact"));

        assert!(!wildcard_match("query:GetQuoteListQuery:*", "query:GetQuoteByIdQuery:{}"));
        assert!(!wildcard_match("a*c", "abcd"));
        assert!(!wildcard_match("exact", "exactly"));
        assert!(!wildcard_match("", "x"));
    }

    #[test]
    fn empty_results_are_not_cached() {
        assert!(!is_cacheable_value(&json!(null)));
        assert!(!is_cacheable_value(&json!([])));
        assert!(!is_cacheable_value(&json!({})));
        assert!(is_cacheable_value(&json!([1])));
        assert!(is_cacheable_value(&json!({"total": 0})));
        assert!(is_cacheable_value(&json!(0)));
    }

    #[test]
    fn scopes_follow_the_query_name() {
        assert_eq!(
            key_scope("query:GetQuoteListQuery:{\"a\":\"x:y\"}"),
            Some("query:GetQuoteListQuery:")
        );
        assert_eq!(key_scope("no-colons"), None);

        assert_eq!(pattern_scope("query:GetQuoteListQuery:*"), Some("query:GetQuoteListQuery:"));
        assert_eq!(pattern_scope("query:*"), None);
        assert_eq!(pattern_scope("query:A:x*"), None);
        assert_eq!(pattern_scope("*"), None);
    }

    #[test]
    fn pattern_covers_every_shape_of_a_query() {
        assert_eq!(pattern_for("GetQuoteListQuery"), "query:GetQuoteListQuery:*");
    }
}
