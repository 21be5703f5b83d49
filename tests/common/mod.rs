#![allow(dead_code)]

pub mod mocks;

use std::sync::Arc;

use jobdesk_lib::application::ports::job_gateway::JobGateway;
use jobdesk_lib::domain::entities::JobSnapshot;
use jobdesk_lib::domain::value_objects::{EntityTag, JobId, JobPayload};
use jobdesk_lib::infrastructure::storage::MemoryDraftStorage;
use jobdesk_lib::{AppConfig, AppState};
use serde_json::{Map, Value};

pub fn job_id(value: &str) -> JobId {
    JobId::new(value.to_string()).expect("valid job id")
}

pub fn fields(value: Value) -> Map<String, Value> {
    value.as_object().cloned().expect("object literal")
}

pub fn snapshot(payload: Value, token: &str) -> JobSnapshot {
    JobSnapshot {
        payload: JobPayload::new(payload).expect("object payload"),
        token: EntityTag::new(token.to_string()).expect("valid token"),
    }
}

/// 下書きをメモリに置いた状態を作る
pub async fn state_with(gateway: Arc<dyn JobGateway>) -> (AppState, MemoryDraftStorage) {
    let storage = MemoryDraftStorage::new();
    let state = AppState::with_storage(AppConfig::default(), gateway, Arc::new(storage.clone()))
        .await
        .expect("default config is valid");
    (state, storage)
}
