//! 命令校验（Validator）
//!
//! 校验器按命令类型注册到 [`ValidationMiddleware`](crate::middleware::ValidationMiddleware)，
//! 在处理器执行前运行；报告失败时处理器不会被调用。
//!
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::command::Command;

/// 字段级错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// 校验报告
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// 条件不满足时记录一条错误
    pub fn check(&mut self, ok: bool, field: &str, message: impl Into<String>) {
        if !ok {
            self.add(field, message);
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }
}

#[async_trait]
pub trait CommandValidator<C>: Send + Sync
where
    C: Command,
{
    async fn validate(&self, cmd: &C) -> ValidationReport;
}
