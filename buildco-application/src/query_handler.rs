use crate::{error::AppResult, query::Query};
use async_trait::async_trait;

#[async_trait]
pub trait QueryHandler<Q>: Send + Sync
where
    Q: Query,
{
    async fn handle(&self, q: &Q) -> AppResult<Q::Output>;
}
