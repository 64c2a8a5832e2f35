use std::collections::HashMap;

use async_trait::async_trait;
use buildco_domain::entity::Entity;
use buildco_domain::error::DomainResult;
use buildco_domain::ports::Repository;
use dashmap::DashMap;

/// 以 DashMap 保存实体的仓储
pub struct InMemoryRepository<E: Entity> {
    entities: DashMap<E::Id, E>,
}

impl<E: Entity> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self {
            entities: DashMap::new(),
        }
    }
}

impl<E: Entity> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// 当前内容的快照
    pub fn snapshot(&self) -> HashMap<E::Id, E> {
        self.entities
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for InMemoryRepository<E> {
    async fn save(&self, entity: &E) -> DomainResult<()> {
        self.entities.insert(entity.id().clone(), entity.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &E::Id) -> DomainResult<Option<E>> {
        Ok(self.entities.get(id).map(|e| e.value().clone()))
    }

    async fn find_all(&self) -> DomainResult<Vec<E>> {
        Ok(self.entities.iter().map(|e| e.value().clone()).collect())
    }

    async fn delete(&self, id: &E::Id) -> DomainResult<bool> {
        Ok(self.entities.remove(id).is_some())
    }
}
