use std::sync::Arc;

use async_trait::async_trait;

use super::{BoxAnySend, CommandCall, CommandMiddleware, Next};
use crate::cache::{QueryCache, pattern_for};
use crate::error::AppResult;

/// 命令成功后失效其 `INVALIDATES` 声明的查询缓存；失败的命令不影响缓存
pub struct CacheInvalidationMiddleware {
    cache: Arc<dyn QueryCache>,
}

impl CacheInvalidationMiddleware {
    pub fn new(cache: Arc<dyn QueryCache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl CommandMiddleware for CacheInvalidationMiddleware {
    fn name(&self) -> &'static str {
        "cache-invalidation"
    }

    async fn handle<'a>(&self, call: CommandCall<'a>, next: Next<'a>) -> AppResult<BoxAnySend> {
        let out = next.run(call).await?;

        for query in call.invalidates {
            let evicted = self.cache.invalidate(&pattern_for(query)).await;
            tracing::debug!(
                command.name = call.name,
                query.name = *query,
                evicted,
                "query cache invalidated"
            );
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryQueryCache;
    use crate::command::Command;
    use crate::envelope::CommandEnvelope;
    use crate::error::AppError;
    use crate::middleware::erase_handler_fn;
    use serde_json::json;
    use std::time::Duration;

    struct Touch {
        envelope: CommandEnvelope,
        fail: bool,
    }

    impl Command for Touch {
        const NAME: &'static str = "Touch";
        const INVALIDATES: &'static [&'static str] = &["ListThings"];
        type Output = ();

        fn envelope(&self) -> &CommandEnvelope {
            &self.envelope
        }
    }

    async fn seeded_cache() -> Arc<InMemoryQueryCache> {
        let cache = Arc::new(InMemoryQueryCache::new());
        let ttl = Duration::from_secs(60);
        cache.set("query:ListThings:{\"page\":1}", json!([1]), ttl).await;
        cache.set("query:GetThing:{\"id\":1}", json!({"id": 1}), ttl).await;
        cache
    }

    async fn run(cache: Arc<InMemoryQueryCache>, fail: bool) -> AppResult<BoxAnySend> {
        let chain: Vec<Arc<dyn CommandMiddleware>> =
            vec![Arc::new(CacheInvalidationMiddleware::new(cache))];
        let handler = erase_handler_fn(|any| {
            Box::pin(async move {
                match any.downcast_ref::<Touch>() {
                    Some(cmd) if !cmd.fail => Ok(Box::new(()) as BoxAnySend),
                    _ => Err(AppError::Infra("write failed".into())),
                }
            })
        });
        let cmd = Touch {
            envelope: CommandEnvelope::default(),
            fail,
        };
        Next::new(&chain, &handler).run(CommandCall::new(&cmd)).await
    }

    #[tokio::test]
    async fn success_evicts_declared_queries_only() {
        let cache = seeded_cache().await;
        run(cache.clone(), false).await.unwrap();

        assert_eq!(cache.get("query:ListThings:{\"page\":1}").await, None);
        assert!(cache.get("query:GetThing:{\"id\":1}").await.is_some());
    }

    #[tokio::test]
    async fn failure_leaves_cache_untouched() {
        let cache = seeded_cache().await;
        assert!(run(cache.clone(), true).await.is_err());
        assert_eq!(cache.len(), 2);
    }
}
