use async_trait::async_trait;
use buildco_domain::error::{DomainError, DomainResult};
use buildco_domain::ports::{FileStorage, StoredFile};
use dashmap::DashMap;
use uuid::Uuid;

/// 文件内容保存在内存中，键为 `<uuid>/<file_name>`
#[derive(Debug, Default)]
pub struct InMemoryFileStorage {
    files: DashMap<String, (StoredFile, Vec<u8>)>,
}

impl InMemoryFileStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn metadata(&self, key: &str) -> Option<StoredFile> {
        self.files.get(key).map(|f| f.0.clone())
    }
}

#[async_trait]
impl FileStorage for InMemoryFileStorage {
    async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> DomainResult<StoredFile> {
        if file_name.trim().is_empty() {
            return Err(DomainError::FileStorage {
                reason: "file name must not be empty".to_string(),
            });
        }

        let stored = StoredFile {
            key: format!("{}/{}", Uuid::new_v4(), file_name.trim()),
            file_name: file_name.trim().to_string(),
            content_type: content_type.to_string(),
            size: bytes.len(),
        };
        self.files
            .insert(stored.key.clone(), (stored.clone(), bytes));
        Ok(stored)
    }

    async fn download(&self, key: &str) -> DomainResult<Vec<u8>> {
        self.files
            .get(key)
            .map(|f| f.1.clone())
            .ok_or_else(|| DomainError::FileStorage {
                reason: format!("no file under key '{key}'"),
            })
    }
}
