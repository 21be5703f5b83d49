use crate::application::ports::job_gateway::JobGateway;
use crate::domain::entities::CacheEntry;
use crate::domain::value_objects::{JobId, JobPayload};
use crate::infrastructure::cache::{EtagStore, JobCache};
use crate::shared::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// ジョブを取得してキャッシュとETagストアを準備する
pub struct JobLoader {
    gateway: Arc<dyn JobGateway>,
    etags: Arc<EtagStore>,
    cache: Arc<JobCache>,
}

impl JobLoader {
    pub fn new(gateway: Arc<dyn JobGateway>, etags: Arc<EtagStore>, cache: Arc<JobCache>) -> Self {
        Self {
            gateway,
            etags,
            cache,
        }
    }

    pub async fn load(&self, job_id: &JobId) -> Result<CacheEntry<JobPayload>> {
        let snapshot = self.gateway.fetch_job(job_id).await?;

        let entry = self.cache.put(job_id.clone(), snapshot.payload).await;
        self.etags.set(job_id.clone(), snapshot.token).await;

        debug!(job_id = %job_id, version = entry.version, "job loaded");
        Ok(entry)
    }

    /// キャッシュが新しければそれを返し、古ければ再取得する
    pub async fn load_if_stale(
        &self,
        job_id: &JobId,
        max_age: Duration,
    ) -> Result<CacheEntry<JobPayload>> {
        if !self.cache.is_stale(job_id, max_age).await
            && let Some(entry) = self.cache.get(job_id).await
        {
            return Ok(entry);
        }
        self.load(job_id).await
    }

    /// 削除済みのジョブをローカル状態から取り除く
    pub async fn forget(&self, job_id: &JobId) {
        self.cache.invalidate(job_id).await;
        self.etags.clear(job_id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::EntityTag;
    use crate::infrastructure::gateway::InMemoryJobGateway;
    use crate::shared::error::AppError;
    use serde_json::json;

    fn job_id() -> JobId {
        JobId::new("job-1".into()).unwrap()
    }

    async fn setup() -> (InMemoryJobGateway, EntityTag, JobLoader, Arc<EtagStore>, Arc<JobCache>) {
        let gateway = InMemoryJobGateway::new();
        let token = gateway
            .seed(job_id(), JobPayload::new(json!({"name": "Kitchen fit-out"})).unwrap())
            .await
            .unwrap();
        let etags = Arc::new(EtagStore::new());
        let cache = Arc::new(JobCache::new());
        let loader = JobLoader::new(Arc::new(gateway.clone()), etags.clone(), cache.clone());
        (gateway, token, loader, etags, cache)
    }

    #[tokio::test]
    async fn test_load_primes_cache_and_token() {
        let (_gateway, token, loader, etags, cache) = setup().await;

        let entry = loader.load(&job_id()).await.unwrap();

        assert_eq!(entry.version, 1);
        assert_eq!(entry.data.get("name"), Some(&json!("Kitchen fit-out")));
        assert_eq!(etags.get(&job_id()).await, Some(token));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_load_if_stale_uses_fresh_cache() {
        let (gateway, _token, loader, _etags, _cache) = setup().await;
        loader.load(&job_id()).await.unwrap();

        gateway.set_offline(true);
        let entry = loader
            .load_if_stale(&job_id(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(entry.version, 1);
    }

    #[tokio::test]
    async fn test_load_if_stale_refetches_old_entries() {
        let (_gateway, _token, loader, _etags, _cache) = setup().await;
        loader.load(&job_id()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let entry = loader
            .load_if_stale(&job_id(), Duration::from_millis(5))
            .await
            .unwrap();

        assert_eq!(entry.version, 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_state_untouched() {
        let (gateway, _token, loader, etags, cache) = setup().await;
        gateway.set_offline(true);

        let err = loader.load(&job_id()).await.unwrap_err();

        assert!(matches!(err, AppError::Network(_)));
        assert!(cache.get(&job_id()).await.is_none());
        assert!(!etags.has(&job_id()).await);
    }

    #[tokio::test]
    async fn test_missing_job_is_not_found() {
        let (_gateway, _token, loader, _etags, _cache) = setup().await;
        let missing = JobId::new("job-404".into()).unwrap();

        let err = loader.load(&missing).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_forget_clears_cache_and_token() {
        let (_gateway, _token, loader, etags, cache) = setup().await;
        loader.load(&job_id()).await.unwrap();

        loader.forget(&job_id()).await;

        assert!(cache.get(&job_id()).await.is_none());
        assert!(etags.get(&job_id()).await.is_none());
    }
}
