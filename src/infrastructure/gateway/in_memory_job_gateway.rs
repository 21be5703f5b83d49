use crate::application::ports::job_gateway::{GatewayError, JobGateway, PatchResponse};
use crate::domain::entities::{DeltaEnvelope, FieldErrors, JobSnapshot, SnapshotBody};
use crate::domain::value_objects::{EntityTag, JobId, JobPayload};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

const READ_ONLY_FIELDS: &[&str] = &["id", "job_number"];

struct StoredJob {
    payload: JobPayload,
    revision: u64,
}

/// プロセス内で動くジョブAPIの代替実装
///
/// トークンは `id:revision` の SHA-256 で、書き込みごとに変わる。
#[derive(Clone, Default)]
pub struct InMemoryJobGateway {
    jobs: Arc<RwLock<HashMap<JobId, StoredJob>>>,
    offline: Arc<AtomicBool>,
    require_token: bool,
    latency: Option<Duration>,
    patch_calls: Arc<AtomicUsize>,
}

impl InMemoryJobGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// `base_token` の無い更新を拒否する
    pub fn requiring_token(mut self) -> Self {
        self.require_token = true;
        self
    }

    /// 更新APIの応答を遅らせる
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub async fn seed(
        &self,
        job_id: JobId,
        payload: JobPayload,
    ) -> Result<EntityTag, GatewayError> {
        let mut jobs = self.jobs.write().await;
        let revision = jobs.get(&job_id).map(|job| job.revision + 1).unwrap_or(1);
        let token = token_for(&job_id, revision)?;
        jobs.insert(job_id, StoredJob { payload, revision });
        Ok(token)
    }

    pub async fn current_token(&self, job_id: &JobId) -> Option<EntityTag> {
        let jobs = self.jobs.read().await;
        jobs.get(job_id)
            .and_then(|job| token_for(job_id, job.revision).ok())
    }

    pub async fn current_payload(&self, job_id: &JobId) -> Option<JobPayload> {
        let jobs = self.jobs.read().await;
        jobs.get(job_id).map(|job| job.payload.clone())
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn patch_calls(&self) -> usize {
        self.patch_calls.load(Ordering::SeqCst)
    }

    fn ensure_online(&self) -> Result<(), GatewayError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(GatewayError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

fn token_for(job_id: &JobId, revision: u64) -> Result<EntityTag, GatewayError> {
    let digest = Sha256::digest(format!("{job_id}:{revision}").as_bytes());
    let mut hex = format!("{digest:x}");
    hex.truncate(32);
    EntityTag::new(hex).map_err(GatewayError::InvalidResponse)
}

#[async_trait]
impl JobGateway for InMemoryJobGateway {
    async fn fetch_job(&self, job_id: &JobId) -> Result<JobSnapshot, GatewayError> {
        self.ensure_online()?;
        let jobs = self.jobs.read().await;
        let job = jobs
            .get(job_id)
            .ok_or_else(|| GatewayError::NotFound(job_id.clone()))?;

        Ok(JobSnapshot {
            payload: job.payload.clone(),
            token: token_for(job_id, job.revision)?,
        })
    }

    async fn patch_job(&self, envelope: &DeltaEnvelope) -> Result<PatchResponse, GatewayError> {
        self.patch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.ensure_online()?;

        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&envelope.job_id)
            .ok_or_else(|| GatewayError::NotFound(envelope.job_id.clone()))?;

        let current = token_for(&envelope.job_id, job.revision)?;
        match &envelope.base_token {
            Some(base) if *base != current => {
                return Ok(PatchResponse::Conflict {
                    reason: format!("ETag mismatch: job {} has changed", envelope.job_id),
                });
            }
            None if self.require_token => {
                return Ok(PatchResponse::Conflict {
                    reason: "If-Match precondition required".to_string(),
                });
            }
            _ => {}
        }

        let mut field_errors = FieldErrors::new();
        for field in READ_ONLY_FIELDS {
            if envelope.changed_fields.contains_key(*field) {
                field_errors.add(field, "This field is read-only.");
            }
        }
        if !field_errors.is_empty() {
            return Ok(PatchResponse::Rejected { field_errors });
        }

        let token = token_for(&envelope.job_id, job.revision + 1)?;
        job.payload = job.payload.merged_with(&envelope.changed_fields);
        job.revision += 1;

        Ok(PatchResponse::Applied {
            snapshot: SnapshotBody::Full(job.payload.clone()),
            token,
        })
    }
}
