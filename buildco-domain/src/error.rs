//! 领域层统一错误定义
//!
//! 聚焦业务规则、值校验、仓储与外部协作方（邮件、文件存储）等最小必要集合，
//! 便于在应用层统一转换为 `AppError`。
//!
use thiserror::Error;

/// 统一错误类型（领域层最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DomainError {
    // --- 领域规则/状态 ---
    #[error("business rule violated: rule={rule}, reason={reason}")]
    BusinessRuleViolation { rule: &'static str, reason: String },
    #[error("invalid state transition: from={from}, to={to}")]
    InvalidStateTransition { from: String, to: String },
    #[error("invalid value: field={field}, reason={reason}")]
    InvalidValue { field: &'static str, reason: String },
    #[error("not found: {entity} {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("already exists: {entity} {id}")]
    AlreadyExists { entity: &'static str, id: String },

    // --- 协作方 ---
    #[error("repository error: {reason}")]
    Repository { reason: String },
    #[error("notification error: {reason}")]
    Notification { reason: String },
    #[error("file storage error: {reason}")]
    FileStorage { reason: String },

    // --- 通用 ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },
    #[error("parse error: {reason}")]
    Parse { reason: String },
}

impl DomainError {
    pub fn invalid_value(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn rule(rule: &'static str, reason: impl Into<String>) -> Self {
        Self::BusinessRuleViolation {
            rule,
            reason: reason.into(),
        }
    }
}

/// 统一 Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;

impl From<uuid::Error> for DomainError {
    fn from(err: uuid::Error) -> Self {
        DomainError::Parse {
            reason: err.to_string(),
        }
    }
}

impl From<chrono::ParseError> for DomainError {
    fn from(err: chrono::ParseError) -> Self {
        DomainError::Parse {
            reason: err.to_string(),
        }
    }
}
