use crate::application::ports::draft_storage::DraftStorage;
use crate::application::ports::job_gateway::JobGateway;
use crate::application::services::{
    DeltaSubmissionService, DeltaSubmissionServiceTrait, DraftStore, JobLoader,
};
use crate::domain::entities::{CacheEntry, Draft, DraftInput, SubmissionResult};
use crate::domain::value_objects::{DraftId, JobId, JobPayload};
use crate::infrastructure::cache::{EtagStore, JobCache};
use crate::infrastructure::gateway::TimeoutGateway;
use crate::infrastructure::storage::FileDraftStorage;
use crate::shared::config::AppConfig;
use crate::shared::error::{AppError, Result};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// アプリケーション全体の状態を管理する構造体
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub etags: Arc<EtagStore>,
    pub cache: Arc<JobCache>,
    pub submissions: Arc<DeltaSubmissionService>,
    pub loader: Arc<JobLoader>,
    pub drafts: Arc<DraftStore>,
}

impl AppState {
    pub async fn new(config: AppConfig, gateway: Arc<dyn JobGateway>) -> Result<Self> {
        config.validate().map_err(AppError::ConfigurationError)?;

        let gateway: Arc<dyn JobGateway> = match config.request_timeout() {
            Some(timeout) => Arc::new(TimeoutGateway::new(gateway, timeout)),
            None => gateway,
        };

        let drafts_path = config.drafts_path();
        let drafts = match FileDraftStorage::open(drafts_path.clone()).await {
            Ok(storage) => DraftStore::open(Arc::new(storage)).await,
            Err(e) => {
                warn!(
                    path = %drafts_path.display(),
                    "Draft directory unavailable, using in-memory drafts: {e}"
                );
                DraftStore::in_memory()
            }
        };

        Ok(Self::assemble(config, gateway, drafts))
    }

    /// 下書きストレージを差し替えて構築する（タイムアウトは付与しない）
    pub async fn with_storage(
        config: AppConfig,
        gateway: Arc<dyn JobGateway>,
        storage: Arc<dyn DraftStorage>,
    ) -> Result<Self> {
        config.validate().map_err(AppError::ConfigurationError)?;

        let drafts = DraftStore::open(storage).await;
        Ok(Self::assemble(config, gateway, drafts))
    }

    fn assemble(config: AppConfig, gateway: Arc<dyn JobGateway>, drafts: DraftStore) -> Self {
        let etags = Arc::new(EtagStore::new());
        let cache = Arc::new(JobCache::new());

        let submissions = Arc::new(DeltaSubmissionService::new(
            gateway.clone(),
            etags.clone(),
            cache.clone(),
        ));
        let loader = Arc::new(JobLoader::new(gateway, etags.clone(), cache.clone()));

        info!("jobdesk state initialized");

        Self {
            config: Arc::new(config),
            etags,
            cache,
            submissions,
            loader,
            drafts: Arc::new(drafts),
        }
    }

    pub async fn request_delta(
        &self,
        job_id: JobId,
        changed_fields: Map<String, Value>,
    ) -> SubmissionResult {
        self.submissions.request_delta(job_id, changed_fields).await
    }

    pub async fn read_cached(&self, job_id: &JobId) -> Option<CacheEntry<JobPayload>> {
        self.cache.get(job_id).await
    }

    pub async fn is_stale(&self, job_id: &JobId, max_age: Duration) -> bool {
        self.cache.is_stale(job_id, max_age).await
    }

    /// 設定の `stale_after_ms` で判定する
    pub async fn is_stale_default(&self, job_id: &JobId) -> bool {
        self.is_stale(job_id, self.config.stale_after()).await
    }

    pub async fn load_job(&self, job_id: &JobId) -> Result<CacheEntry<JobPayload>> {
        self.loader
            .load_if_stale(job_id, self.config.stale_after())
            .await
    }

    pub async fn refresh_job(&self, job_id: &JobId) -> Result<CacheEntry<JobPayload>> {
        self.loader.load(job_id).await
    }

    pub async fn list_drafts(&self) -> Vec<Draft> {
        self.drafts.list().await
    }

    pub async fn get_draft(&self, draft_id: &DraftId) -> Option<Draft> {
        self.drafts.get(draft_id).await
    }

    pub async fn save_draft(&self, input: DraftInput) -> DraftId {
        self.drafts.save(input).await
    }

    pub async fn delete_draft(&self, draft_id: &DraftId) {
        self.drafts.delete(draft_id).await
    }

    /// トークン、キャッシュ、下書きをすべて破棄する
    pub async fn logout(&self) {
        self.etags.clear_all().await;
        self.cache.clear().await;
        self.drafts.clear_all().await;
        info!("local job state cleared");
    }
}
