use crate::domain::value_objects::{EntityTag, JobId};
use serde::Serialize;
use serde_json::{Map, Value};

/// 部分更新リクエスト（送信ごとに生成し、永続化しない）
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DeltaEnvelope {
    pub job_id: JobId,
    pub changed_fields: Map<String, Value>,
    pub base_token: Option<EntityTag>,
}

impl DeltaEnvelope {
    pub fn new(
        job_id: JobId,
        changed_fields: Map<String, Value>,
        base_token: Option<EntityTag>,
    ) -> Result<Self, String> {
        if changed_fields.is_empty() {
            return Err("Delta must change at least one field".to_string());
        }
        Ok(Self {
            job_id,
            changed_fields,
            base_token,
        })
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.changed_fields.keys().map(String::as_str).collect()
    }
}
