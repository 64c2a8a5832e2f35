//! 处理器注册表（HandlerRegistry）
//!
//! 以类型的稳定名称（`Command::NAME` / `Query::NAME`）为键保存处理器，同时记录注册时的
//! `TypeId`，以便发现"不同类型声明了同一名称"的配置错误。
//!
//! 重复注册策略：默认拒绝（`AlreadyRegistered`）；`allow_override = true` 时以新处理器覆盖。
//! 检查与写入通过 `DashMap::entry` 一次完成，并发注册时恰有一方胜出。
//!
use std::any::{TypeId, type_name};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::error::{AppError, AppResult};

/// 类型标识：`TypeId` + 类型名（仅用于错误信息）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeKey {
    id: TypeId,
    type_name: &'static str,
}

impl TypeKey {
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

struct Registration<H> {
    key: TypeKey,
    handler: H,
}

pub struct HandlerRegistry<H> {
    kind: &'static str,
    allow_override: bool,
    entries: DashMap<&'static str, Registration<H>>,
}

impl<H: Clone> HandlerRegistry<H> {
    /// `kind` 仅用于错误信息（如 "command" / "query" / "validator"）
    pub fn new(kind: &'static str, allow_override: bool) -> Self {
        Self {
            kind,
            allow_override,
            entries: DashMap::new(),
        }
    }

    pub fn register(&self, name: &'static str, key: TypeKey, handler: H) -> AppResult<()> {
        match self.entries.entry(name) {
            Entry::Occupied(mut slot) if self.allow_override => {
                tracing::warn!(
                    registry.kind = self.kind,
                    registry.name = name,
                    "handler overridden"
                );
                slot.insert(Registration { key, handler });
                Ok(())
            }
            Entry::Occupied(_) => Err(AppError::AlreadyRegistered {
                kind: self.kind,
                name,
            }),
            Entry::Vacant(slot) => {
                slot.insert(Registration { key, handler });
                Ok(())
            }
        }
    }

    /// 查找处理器；名称存在但类型不一致时返回 `TypeMismatch`
    pub fn get(&self, name: &'static str, key: TypeKey) -> AppResult<Option<H>> {
        let Some(entry) = self.entries.get(name) else {
            return Ok(None);
        };

        if entry.key.id != key.id {
            return Err(AppError::TypeMismatch {
                expected: entry.key.type_name,
                found: key.type_name,
            });
        }

        Ok(Some(entry.handler.clone()))
    }

    pub fn resolve(&self, name: &'static str, key: TypeKey) -> AppResult<H> {
        self.get(name, key)?.ok_or(AppError::HandlerNotFound(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// 已注册的名称（排序，便于断言与展示）
    pub fn list_registered(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.entries.iter().map(|e| *e.key()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
