use crate::entity::Entity;
use crate::error::DomainResult;
use async_trait::async_trait;

/// 实体仓储
#[async_trait]
pub trait Repository<E>: Send + Sync
where
    E: Entity,
{
    /// 新增或覆盖保存
    async fn save(&self, entity: &E) -> DomainResult<()>;

    async fn find_by_id(&self, id: &E::Id) -> DomainResult<Option<E>>;

    async fn find_all(&self) -> DomainResult<Vec<E>>;

    /// 删除实体，返回是否确实存在
    async fn delete(&self, id: &E::Id) -> DomainResult<bool>;
}
