use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::time::Instant;

use super::{QueryCache, key_scope, pattern_scope, wildcard_match};

struct CacheEntry {
    value: serde_json::Value,
    expires_at: Instant,
    created_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// 基于内存的 QueryCache 实现
/// - 进程内共享（`Arc<InMemoryQueryCache>`），以 DashMap 保证并发安全
/// - 过期基于 `tokio::time::Instant`，测试中可通过暂停时钟推进时间
/// - 代数 = 全局纪元 + 作用域计数；`query:<NAME>:*` 只推进该作用域，其余模式与 `clear` 推进纪元
#[derive(Default)]
pub struct InMemoryQueryCache {
    entries: DashMap<String, CacheEntry>,
    scoped: DashMap<String, u64>,
    epoch: AtomicU64,
    /// 失效持写锁，条件写入持读锁
    gate: RwLock<()>,
}

impl InMemoryQueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前条目数（包含尚未被惰性淘汰的过期条目）
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 主动清理全部过期条目，返回清理数量
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, e| !e.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    fn current_generation(&self, key: &str) -> u64 {
        let scoped = key_scope(key)
            .and_then(|scope| self.scoped.get(scope).map(|g| *g))
            .unwrap_or(0);
        self.epoch.load(Ordering::Acquire) + scoped
    }

    fn insert(&self, key: &str, value: serde_json::Value, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
            created_at: Utc::now(),
        };
        self.entries.insert(key.to_string(), entry);
    }
}

#[async_trait]
impl QueryCache for InMemoryQueryCache {
    async fn get(&self, key: &str) -> Option<serde_json::Value> {
        let now = Instant::now();

        // 读锁必须在 remove 之前释放
        let created_at = match self.entries.get(key) {
            None => return None,
            Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
            Some(entry) => entry.created_at,
        };

        self.entries.remove_if(key, |_, e| e.is_expired(now));
        tracing::trace!(
            cache.key = key,
            cache.created_at = %created_at,
            "expired entry evicted on read"
        );
        None
    }

    async fn set(&self, key: &str, value: serde_json::Value, ttl: Duration) {
        self.insert(key, value, ttl);
    }

    async fn generation(&self, key: &str) -> u64 {
        self.current_generation(key)
    }

    async fn set_if_generation(
        &self,
        key: &str,
        value: serde_json::Value,
        ttl: Duration,
        generation: u64,
    ) -> bool {
        let _read = self.gate.read().unwrap_or_else(PoisonError::into_inner);
        if self.current_generation(key) != generation {
            return false;
        }
        self.insert(key, value, ttl);
        true
    }

    async fn invalidate(&self, pattern: &str) -> usize {
        let _write = self.gate.write().unwrap_or_else(PoisonError::into_inner);
        match pattern_scope(pattern) {
            Some(scope) => *self.scoped.entry(scope.to_string()).or_insert(0) += 1,
            None => {
                self.epoch.fetch_add(1, Ordering::AcqRel);
            }
        }

        let mut evicted = 0;
        self.entries.retain(|key, _| {
            let hit = wildcard_match(pattern, key);
            if hit {
                evicted += 1;
            }
            !hit
        });
        evicted
    }

    async fn clear(&self) {
        let _write = self.gate.write().unwrap_or_else(PoisonError::into_inner);
        self.epoch.fetch_add(1, Ordering::AcqRel);
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn set_then_get() {
        let cache = InMemoryQueryCache::new();
        cache.set("k", json!({"n": 1}), Duration::from_secs(60)).await;
        assert_eq!(cache.get("k").await, Some(json!({"n": 1})));
        assert_eq!(cache.get("missing").await, None);
    }

    #[tokio::test]
    async fn set_overwrites() {
        let cache = InMemoryQueryCache::new();
        cache.set("k", json!(1), Duration::from_secs(60)).await;
        cache.set("k", json!(2), Duration::from_secs(60)).await;
        assert_eq!(cache.get("k").await, Some(json!(2)));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn entry_expires_and_is_evicted_on_read() {
        let cache = InMemoryQueryCache::new();
        cache.set("k", json!("v"), Duration::from_secs(1)).await;

        tokio::time::advance(Duration::from_millis(900)).await;
        assert!(cache.get("k").await.is_some());

        tokio::time::advance(Duration::from_millis(200)).await;
        assert_eq!(cache.get("k").await, None);
        assert!(cache.is_empty(), "expired entry must be removed, not just hidden");
    }

    #[tokio::test]
    async fn entry_expires_in_real_time() {
        let cache = InMemoryQueryCache::new();
        cache.set("k", json!("v"), Duration::from_secs(1)).await;
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn invalidate_by_prefix_leaves_other_keys() {
        let cache = InMemoryQueryCache::new();
        let ttl = Duration::from_secs(60);
        cache.set("query:GetQuoteListQuery:{\"a\":1}", json!(1), ttl).await;
        cache.set("query:GetQuoteListQuery:{\"a\":2}", json!(2), ttl).await;
        cache.set("query:GetQuoteByIdQuery:{\"id\":1}", json!(3), ttl).await;

        let evicted = cache.invalidate("query:GetQuoteListQuery:*").await;
        assert_eq!(evicted, 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("query:GetQuoteByIdQuery:{\"id\":1}").await.is_some());

        assert_eq!(cache.invalidate("query:Nothing:*").await, 0);
    }

    #[tokio::test]
    async fn clear_evicts_everything() {
        let cache = InMemoryQueryCache::new();
        cache.set("a", json!(1), Duration::from_secs(60)).await;
        cache.set("b", json!(2), Duration::from_secs(60)).await;
        cache.clear().await;
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn conditional_set_is_refused_after_invalidation() {
        let cache = InMemoryQueryCache::new();
        let ttl = Duration::from_secs(60);
        let list = "query:GetQuoteListQuery:{}";

        let seen = cache.generation(list).await;
        assert!(cache.set_if_generation(list, json!(1), ttl, seen).await);

        let seen = cache.generation(list).await;
        cache.invalidate("query:GetQuoteListQuery:*").await;
        assert!(!cache.set_if_generation(list, json!(2), ttl, seen).await);
        assert_eq!(cache.get(list).await, None);

        let fresh = cache.generation(list).await;
        assert!(cache.set_if_generation(list, json!(3), ttl, fresh).await);
        assert_eq!(cache.get(list).await, Some(json!(3)));
    }

    #[tokio::test]
    async fn invalidation_only_ages_its_own_scope() {
        let cache = InMemoryQueryCache::new();
        let by_id = "query:GetQuoteByIdQuery:{}";

        let seen = cache.generation(by_id).await;
        cache.invalidate("query:GetQuoteListQuery:*").await;
        assert_eq!(cache.generation(by_id).await, seen);

        cache.invalidate("query:*").await;
        assert_ne!(cache.generation(by_id).await, seen);

        let seen = cache.generation(by_id).await;
        cache.clear().await;
        assert_ne!(cache.generation(by_id).await, seen);
    }

    #[tokio::test(start_paused = true)]
    async fn purge_removes_only_expired() {
        let cache = InMemoryQueryCache::new();
        cache.set("short", json!(1), Duration::from_secs(1)).await;
        cache.set("long", json!(2), Duration::from_secs(60)).await;

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
    }
}
