use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// 永続ストレージが使えない（この場合セッション中はメモリのみで動作する）
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 下書き一式を1エントリとして読み書きする永続化ポート
#[async_trait]
pub trait DraftStorage: Send + Sync {
    async fn read(&self) -> Result<Option<String>, StorageError>;

    async fn write(&self, contents: &str) -> Result<(), StorageError>;
}
