use crate::{command::Command, error::AppResult};
use async_trait::async_trait;

#[async_trait]
pub trait CommandHandler<C>: Send + Sync
where
    C: Command,
{
    async fn handle(&self, cmd: &C) -> AppResult<C::Output>;
}
