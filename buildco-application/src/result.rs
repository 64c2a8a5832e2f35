use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::validation::FieldError;

/// 对外可见的非校验类错误统一归到该字段名下
pub const GENERAL_ERROR_FIELD: &str = "general";

/// 一次命令/查询执行的结果信封
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub errors: Vec<FieldError>,
    /// 源命令/查询 id
    pub source_id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: Option<u64>,
    /// 查询结果是否来自缓存
    pub cache_hit: bool,
}

impl<T> ExecutionResult<T> {
    pub fn success(source_id: Uuid, data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            errors: Vec::new(),
            source_id,
            completed_at: Utc::now(),
            duration_ms: None,
            cache_hit: false,
        }
    }

    pub fn failure(source_id: Uuid, errors: Vec<FieldError>) -> Self {
        Self {
            success: false,
            data: None,
            errors,
            source_id,
            completed_at: Utc::now(),
            duration_ms: None,
            cache_hit: false,
        }
    }

    /// 边界层转换：校验错误保留字段级信息，其余错误只给出通用提示
    pub fn from_error(source_id: Uuid, err: &AppError) -> Self {
        let errors = match err {
            AppError::CommandValidation { errors, .. } => errors.clone(),
            other => vec![FieldError::new(GENERAL_ERROR_FIELD, other.public_message())],
        };
        Self::failure(source_id, errors)
    }

    pub fn with_duration(mut self, elapsed: Duration) -> Self {
        self.duration_ms = Some(elapsed.as_millis() as u64);
        self
    }

    pub(crate) fn from_cache(mut self) -> Self {
        self.cache_hit = true;
        self
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }
}
