use async_trait::async_trait;
use mockall::mock;

use jobdesk_lib::application::ports::job_gateway::{GatewayError, JobGateway, PatchResponse};
use jobdesk_lib::domain::entities::{DeltaEnvelope, JobSnapshot};
use jobdesk_lib::domain::value_objects::JobId;

mock! {
    pub JobGatewayPort {}

    #[async_trait]
    impl JobGateway for JobGatewayPort {
        async fn fetch_job(&self, job_id: &JobId) -> Result<JobSnapshot, GatewayError>;
        async fn patch_job(&self, envelope: &DeltaEnvelope) -> Result<PatchResponse, GatewayError>;
    }
}

pub type MockJobGateway = MockJobGatewayPort;
