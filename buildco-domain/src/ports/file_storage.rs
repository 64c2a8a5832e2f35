use crate::error::DomainResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// 已存储文件的元信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    /// 存储键（后续下载时使用）
    pub key: String,
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
}

/// 文件存储
#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> DomainResult<StoredFile>;

    async fn download(&self, key: &str) -> DomainResult<Vec<u8>>;
}
