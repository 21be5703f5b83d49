use crate::application::ports::job_gateway::{GatewayError, JobGateway, PatchResponse};
use crate::domain::entities::{DeltaEnvelope, JobSnapshot};
use crate::domain::value_objects::JobId;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// 任意のゲートウェイにタイムアウトを付与するラッパー
pub struct TimeoutGateway {
    inner: Arc<dyn JobGateway>,
    timeout: Duration,
}

impl TimeoutGateway {
    pub fn new(inner: Arc<dyn JobGateway>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    fn elapsed_error(&self, job_id: &JobId) -> GatewayError {
        let ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
        warn!(job_id = %job_id, timeout_ms = ms, "gateway request timed out");
        GatewayError::Timeout(ms)
    }
}

#[async_trait]
impl JobGateway for TimeoutGateway {
    async fn fetch_job(&self, job_id: &JobId) -> Result<JobSnapshot, GatewayError> {
        tokio::time::timeout(self.timeout, self.inner.fetch_job(job_id))
            .await
            .map_err(|_| self.elapsed_error(job_id))?
    }

    async fn patch_job(&self, envelope: &DeltaEnvelope) -> Result<PatchResponse, GatewayError> {
        tokio::time::timeout(self.timeout, self.inner.patch_job(envelope))
            .await
            .map_err(|_| self.elapsed_error(&envelope.job_id))?
    }
}
