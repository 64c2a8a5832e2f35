use std::any::{Any, type_name};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::cache::{QueryCache, cache_key, is_cacheable_value, pattern_for};
use crate::config::DispatcherConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::{BoxAnySend, ErasedHandlerFn, erase_handler_fn};
use crate::query::Query;
use crate::query_bus::QueryBus;
use crate::query_handler::QueryHandler;
use crate::registry::{HandlerRegistry, TypeKey};
use crate::result::ExecutionResult;

/// 进程内查询分发器，带结果缓存
///
/// - 缓存策略由 `Query::CACHE` 决定，`Disabled` 的查询读写都绕过缓存；
/// - 命中时不调用处理器，结果标记 `cache_hit = true`；
/// - 失败结果与空结果（null、空数组、空对象）不写入缓存；
/// - 处理器执行期间该查询被失效过时，结果只返回不写入缓存。
pub struct QueryDispatcher {
    handlers: HandlerRegistry<ErasedHandlerFn>,
    cache: Arc<dyn QueryCache>,
    default_ttl: Duration,
    timeout: Option<Duration>,
}

impl QueryDispatcher {
    pub fn new(config: &DispatcherConfig, cache: Arc<dyn QueryCache>) -> Self {
        Self {
            handlers: HandlerRegistry::new("query", config.allow_handler_override),
            cache,
            default_ttl: config.default_query_ttl,
            timeout: config.dispatch_timeout,
        }
    }

    /// 注册查询处理器
    pub fn register<Q, H>(&self, handler: Arc<H>) -> AppResult<()>
    where
        Q: Query,
        H: QueryHandler<Q> + 'static,
    {
        let f = erase_handler_fn(move |any| {
            let handler = handler.clone();

            Box::pin(async move {
                let Some(q) = any.downcast_ref::<Q>() else {
                    return Err(AppError::TypeMismatch {
                        expected: type_name::<Q>(),
                        found: "unknown",
                    });
                };
                let dto = handler.handle(q).await?;
                Ok(Box::new(dto) as BoxAnySend)
            })
        });

        self.handlers.register(Q::NAME, TypeKey::of::<Q>(), f)?;
        tracing::debug!(query.name = Q::NAME, "query handler registered");
        Ok(())
    }

    /// 已注册的查询名称（排序）
    pub fn registered_queries(&self) -> Vec<&'static str> {
        self.handlers.list_registered()
    }

    /// 失效某一查询类型的全部缓存结果，返回移除数量
    pub async fn invalidate<Q: Query>(&self) -> usize {
        self.cache.invalidate(&pattern_for(Q::NAME)).await
    }

    pub fn cache(&self) -> &Arc<dyn QueryCache> {
        &self.cache
    }

    async fn run_handler<Q: Query>(&self, handler: &ErasedHandlerFn, q: &Q) -> AppResult<Q::Output> {
        let run = handler(q as &(dyn Any + Send + Sync));
        let out = match self.timeout {
            Some(after) => tokio::time::timeout(after, run)
                .await
                .map_err(|_| AppError::Timeout {
                    name: Q::NAME,
                    after,
                })??,
            None => run.await?,
        };

        out.downcast::<Q::Output>()
            .map(|dto| *dto)
            .map_err(|_| AppError::TypeMismatch {
                expected: type_name::<Q::Output>(),
                found: "unknown",
            })
    }

    async fn lookup<Q: Query>(&self, key: &str) -> Option<Q::Output> {
        let value = self.cache.get(key).await?;
        match serde_json::from_value::<Q::Output>(value) {
            Ok(dto) => Some(dto),
            Err(e) => {
                tracing::warn!(
                    query.name = Q::NAME,
                    cache.key = key,
                    error = %e,
                    "undecodable cache entry, treated as a miss"
                );
                None
            }
        }
    }

    async fn store<Q: Query>(&self, key: &str, dto: &Q::Output, ttl: Duration, generation: u64) {
        match serde_json::to_value(dto) {
            Ok(value) if is_cacheable_value(&value) => {
                if !self.cache.set_if_generation(key, value, ttl, generation).await {
                    tracing::debug!(
                        query.name = Q::NAME,
                        cache.key = key,
                        "invalidated while running, result not cached"
                    );
                }
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(
                query.name = Q::NAME,
                error = %e,
                "query result not cacheable"
            ),
        }
    }
}

#[async_trait]
impl QueryBus for QueryDispatcher {
    async fn dispatch<Q>(&self, q: Q) -> AppResult<ExecutionResult<Q::Output>>
    where
        Q: Query,
    {
        let started = Instant::now();
        let source_id = q.envelope().id();
        let handler = self.handlers.resolve(Q::NAME, TypeKey::of::<Q>())?;

        let cached = match Q::CACHE.ttl(self.default_ttl) {
            Some(ttl) => Some((cache_key(&q)?, ttl)),
            None => None,
        };

        if let Some((key, _)) = &cached {
            if let Some(dto) = self.lookup::<Q>(key).await {
                tracing::debug!(query.name = Q::NAME, query.id = %source_id, "query cache hit");
                return Ok(ExecutionResult::success(source_id, dto)
                    .from_cache()
                    .with_duration(started.elapsed()));
            }
        }

        let generation = match &cached {
            Some((key, _)) => Some(self.cache.generation(key).await),
            None => None,
        };

        let dto = self.run_handler(&handler, &q).await?;

        if let (Some((key, ttl)), Some(generation)) = (&cached, generation) {
            self.store::<Q>(key, &dto, *ttl, generation).await;
        }

        tracing::debug!(
            query.name = Q::NAME,
            query.id = %source_id,
            duration.ms = started.elapsed().as_millis() as u64,
            "query executed"
        );
        Ok(ExecutionResult::success(source_id, dto).with_duration(started.elapsed()))
    }
}
