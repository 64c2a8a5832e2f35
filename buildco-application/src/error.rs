use std::time::Duration;

use buildco_domain::error::DomainError;

use crate::validation::FieldError;

#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("domain: {0}")]
    Domain(#[from] DomainError),

    #[error("command validation failed: command={command}, {} field error(s)", errors.len())]
    CommandValidation {
        command: &'static str,
        errors: Vec<FieldError>,
    },

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("handler not found: {0}")]
    HandlerNotFound(&'static str),

    #[error("handler already registered: {kind}={name}")]
    AlreadyRegistered {
        kind: &'static str,
        name: &'static str,
    },

    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("dispatch timed out: {name} after {after:?}")]
    Timeout { name: &'static str, after: Duration },

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config: {0}")]
    Config(String),

    #[error("infra: {0}")]
    Infra(String),
}

/// 统一 Result 类型别名
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// 调用方可自行修正的错误（HTTP 400 语义）
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::CommandValidation { .. }
                | Self::InvalidQuery(_)
                | Self::Domain(
                    DomainError::InvalidValue { .. }
                        | DomainError::BusinessRuleViolation { .. }
                        | DomainError::InvalidStateTransition { .. }
                        | DomainError::AlreadyExists { .. }
                        | DomainError::NotFound { .. }
                )
        )
    }

    /// 对外可见的错误信息：客户端错误保留原因，其余统一为通用提示，不暴露内部细节
    pub fn public_message(&self) -> String {
        if self.is_client_error() {
            self.to_string()
        } else {
            "an unexpected error occurred".to_string()
        }
    }
}
