use crate::application::ports::draft_storage::{DraftStorage, StorageError};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// メモリ上のストレージ（永続ストレージが使えない場合の代替）
#[derive(Clone, Default)]
pub struct MemoryDraftStorage {
    contents: Arc<RwLock<Option<String>>>,
}

impl MemoryDraftStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Arc::new(RwLock::new(Some(contents.into()))),
        }
    }

    pub async fn snapshot(&self) -> Option<String> {
        self.contents.read().await.clone()
    }
}

#[async_trait]
impl DraftStorage for MemoryDraftStorage {
    async fn read(&self) -> Result<Option<String>, StorageError> {
        Ok(self.contents.read().await.clone())
    }

    async fn write(&self, contents: &str) -> Result<(), StorageError> {
        *self.contents.write().await = Some(contents.to_string());
        Ok(())
    }
}
