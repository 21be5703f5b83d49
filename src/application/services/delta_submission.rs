use crate::application::ports::job_gateway::{JobGateway, PatchResponse};
use crate::domain::entities::{
    CacheEntry, DeltaEnvelope, FieldErrors, NON_FIELD_ERRORS, SnapshotBody, SubmissionPhase,
    SubmissionResult,
};
use crate::domain::value_objects::{EntityTag, JobId, JobPayload};
use crate::infrastructure::cache::{EtagStore, JobCache};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

#[async_trait]
pub trait DeltaSubmissionServiceTrait: Send + Sync {
    async fn request_delta(
        &self,
        job_id: JobId,
        changed_fields: Map<String, Value>,
    ) -> SubmissionResult;

    fn phase(&self, job_id: &JobId) -> SubmissionPhase;
}

pub struct DeltaSubmissionService {
    gateway: Arc<dyn JobGateway>,
    etags: Arc<EtagStore>,
    cache: Arc<JobCache>,
    in_flight: Mutex<HashSet<JobId>>,
}

impl DeltaSubmissionService {
    pub fn new(gateway: Arc<dyn JobGateway>, etags: Arc<EtagStore>, cache: Arc<JobCache>) -> Self {
        Self {
            gateway,
            etags,
            cache,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// キャッシュとトークンを同じタスク内で更新する
    ///
    /// 呼び出し側の Future が破棄されても両方の書き込みが完了する。
    async fn apply_success(
        &self,
        job_id: &JobId,
        snapshot: SnapshotBody,
        token: EntityTag,
    ) -> SubmissionResult {
        let commit = tokio::spawn(commit_success(
            self.cache.clone(),
            self.etags.clone(),
            job_id.clone(),
            snapshot,
            token.clone(),
        ));

        match commit.await {
            Ok(entry) => SubmissionResult::Success {
                entry,
                new_token: token,
            },
            Err(e) => {
                warn!(job_id = %job_id, "failed to record applied delta: {e}");
                SubmissionResult::NetworkFailure {
                    cause: format!("applied delta could not be recorded: {e}"),
                }
            }
        }
    }
}

async fn commit_success(
    cache: Arc<JobCache>,
    etags: Arc<EtagStore>,
    job_id: JobId,
    snapshot: SnapshotBody,
    token: EntityTag,
) -> CacheEntry<JobPayload> {
    let entry = match snapshot {
        SnapshotBody::Full(payload) => cache.put(job_id.clone(), payload).await,
        SnapshotBody::Partial(fields) => {
            cache
                .put_with(job_id.clone(), move |previous| match previous {
                    Some(current) => current.merged_with(fields.as_map()),
                    None => fields,
                })
                .await
        }
    };
    etags.set(job_id, token).await;
    entry
}

#[async_trait]
impl DeltaSubmissionServiceTrait for DeltaSubmissionService {
    async fn request_delta(
        &self,
        job_id: JobId,
        changed_fields: Map<String, Value>,
    ) -> SubmissionResult {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight, &job_id) else {
            debug!(job_id = %job_id, "submission already in flight");
            return SubmissionResult::Busy;
        };

        let base_token = self.etags.get(&job_id).await;
        let envelope = match DeltaEnvelope::new(job_id.clone(), changed_fields, base_token) {
            Ok(envelope) => envelope,
            Err(message) => {
                return SubmissionResult::ValidationFailure {
                    field_errors: FieldErrors::single(NON_FIELD_ERRORS, message),
                };
            }
        };

        debug!(
            job_id = %job_id,
            fields = ?envelope.field_names(),
            has_token = envelope.base_token.is_some(),
            "submitting delta"
        );

        let result = match self.gateway.patch_job(&envelope).await {
            Ok(PatchResponse::Applied { snapshot, token }) => {
                self.apply_success(&job_id, snapshot, token).await
            }
            Ok(PatchResponse::Conflict { reason }) => {
                warn!(job_id = %job_id, %reason, "delta rejected by concurrency check");
                SubmissionResult::Conflict { reason }
            }
            Ok(PatchResponse::Rejected { field_errors }) => {
                SubmissionResult::ValidationFailure { field_errors }
            }
            Err(e) => {
                warn!(job_id = %job_id, "delta submission failed: {e}");
                SubmissionResult::NetworkFailure {
                    cause: e.to_string(),
                }
            }
        };

        if let SubmissionResult::Success { entry, .. } = &result {
            info!(job_id = %job_id, version = entry.version, "delta applied");
        } else {
            debug!(job_id = %job_id, outcome = %result.outcome(), "delta not applied");
        }
        result
    }

    fn phase(&self, job_id: &JobId) -> SubmissionPhase {
        if lock(&self.in_flight).contains(job_id) {
            SubmissionPhase::Submitting
        } else {
            SubmissionPhase::Idle
        }
    }
}

/// 送信中マーカー。どの経路で抜けても（Future の破棄を含む）解除される
struct InFlightGuard<'a> {
    in_flight: &'a Mutex<HashSet<JobId>>,
    job_id: JobId,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(in_flight: &'a Mutex<HashSet<JobId>>, job_id: &JobId) -> Option<Self> {
        if !lock(in_flight).insert(job_id.clone()) {
            return None;
        }
        Some(Self {
            in_flight,
            job_id: job_id.clone(),
        })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        lock(self.in_flight).remove(&self.job_id);
    }
}

fn lock(in_flight: &Mutex<HashSet<JobId>>) -> MutexGuard<'_, HashSet<JobId>> {
    in_flight.lock().unwrap_or_else(PoisonError::into_inner)
}
