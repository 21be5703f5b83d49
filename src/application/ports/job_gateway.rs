use crate::domain::entities::{DeltaEnvelope, FieldErrors, JobSnapshot, SnapshotBody};
use crate::domain::value_objects::job_payload::json_kind;
use crate::domain::value_objects::{EntityTag, JobId, JobPayload};
use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out after {0} ms")]
    Timeout(u64),

    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("job not found: {0}")]
    NotFound(JobId),
}

/// 部分更新APIの応答（通信エラーは `GatewayError` 側）
#[derive(Debug, Clone, PartialEq)]
pub enum PatchResponse {
    Applied {
        snapshot: SnapshotBody,
        token: EntityTag,
    },
    Conflict {
        reason: String,
    },
    Rejected {
        field_errors: FieldErrors,
    },
}

impl PatchResponse {
    /// HTTP応答を `PatchResponse` に変換する
    ///
    /// 2xx は適用、409/412 は競合、400/422 は検証エラー。
    /// 本文の無い 2xx は送信した差分そのものを部分スナップショットとして扱う。
    pub fn from_http(
        envelope: &DeltaEnvelope,
        status: u16,
        etag_header: Option<&str>,
        body: Value,
    ) -> Result<Self, GatewayError> {
        match status {
            200..=299 => {
                let token = etag_header
                    .ok_or_else(|| {
                        GatewayError::InvalidResponse("missing ETag header".to_string())
                    })
                    .and_then(|raw| {
                        EntityTag::from_header(raw).map_err(GatewayError::InvalidResponse)
                    })?;

                let snapshot = match body {
                    Value::Null => SnapshotBody::Partial(JobPayload::from_map(
                        envelope.changed_fields.clone(),
                    )),
                    Value::Object(map) => {
                        check_snapshot_id(&envelope.job_id, &map)?;
                        SnapshotBody::Full(JobPayload::from_map(map))
                    }
                    other => {
                        return Err(GatewayError::InvalidResponse(format!(
                            "expected a job object, got {}",
                            json_kind(&other)
                        )));
                    }
                };

                Ok(PatchResponse::Applied { snapshot, token })
            }
            409 | 412 => Ok(PatchResponse::Conflict {
                reason: conflict_reason(&body),
            }),
            400 | 422 => Ok(PatchResponse::Rejected {
                field_errors: FieldErrors::from_json(&body),
            }),
            404 => Err(GatewayError::NotFound(envelope.job_id.clone())),
            _ => Err(GatewayError::UnexpectedStatus {
                status,
                body: body.to_string(),
            }),
        }
    }
}

fn check_snapshot_id(
    expected: &JobId,
    map: &serde_json::Map<String, Value>,
) -> Result<(), GatewayError> {
    match map.get("id") {
        Some(Value::String(id)) if id != expected.as_str() => Err(
            GatewayError::InvalidResponse(format!("snapshot id {id} does not match {expected}")),
        ),
        _ => Ok(()),
    }
}

fn conflict_reason(body: &Value) -> String {
    ["detail", "message", "error"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| "job was modified by someone else".to_string())
}

/// 生成済みAPIクライアントへの境界
#[async_trait]
pub trait JobGateway: Send + Sync {
    async fn fetch_job(&self, job_id: &JobId) -> Result<JobSnapshot, GatewayError>;

    async fn patch_job(&self, envelope: &DeltaEnvelope) -> Result<PatchResponse, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope() -> DeltaEnvelope {
        DeltaEnvelope::new(
            JobId::new("job-1".into()).unwrap(),
            json!({"name": "X"}).as_object().cloned().unwrap(),
            Some(EntityTag::new("abc".into()).unwrap()),
        )
        .unwrap()
    }

    #[test]
    fn ok_with_body_is_a_full_snapshot() {
        let response = PatchResponse::from_http(
            &envelope(),
            200,
            Some("W/\"def\""),
            json!({"id": "job-1", "name": "X", "status": "quoting"}),
        )
        .unwrap();

        match response {
            PatchResponse::Applied {
                snapshot: SnapshotBody::Full(payload),
                token,
            } => {
                assert_eq!(token.as_str(), "def");
                assert_eq!(payload.get("status"), Some(&json!("quoting")));
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn no_content_echoes_the_delta_as_partial() {
        let response =
            PatchResponse::from_http(&envelope(), 204, Some("\"def\""), Value::Null).unwrap();

        match response {
            PatchResponse::Applied {
                snapshot: SnapshotBody::Partial(payload),
                ..
            } => assert_eq!(payload.get("name"), Some(&json!("X"))),
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn success_without_etag_is_invalid() {
        let err = PatchResponse::from_http(&envelope(), 200, None, json!({"name": "X"}))
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidResponse(_)));
    }

    #[test]
    fn mismatched_snapshot_id_is_invalid() {
        let err = PatchResponse::from_http(
            &envelope(),
            200,
            Some("\"def\""),
            json!({"id": "job-2"}),
        )
        .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidResponse(_)));
    }

    #[test]
    fn precondition_statuses_are_conflicts() {
        for status in [409, 412] {
            let response = PatchResponse::from_http(
                &envelope(),
                status,
                None,
                json!({"detail": "ETag mismatch"}),
            )
            .unwrap();
            assert_eq!(
                response,
                PatchResponse::Conflict {
                    reason: "ETag mismatch".to_string()
                }
            );
        }
    }

    #[test]
    fn unprocessable_entity_carries_field_errors() {
        let response = PatchResponse::from_http(
            &envelope(),
            422,
            None,
            json!({"name": ["too long"]}),
        )
        .unwrap();
        match response {
            PatchResponse::Rejected { field_errors } => {
                assert_eq!(field_errors.get("name"), Some(&["too long".to_string()][..]));
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn other_statuses_are_gateway_errors() {
        assert!(matches!(
            PatchResponse::from_http(&envelope(), 404, None, Value::Null),
            Err(GatewayError::NotFound(_))
        ));
        assert!(matches!(
            PatchResponse::from_http(&envelope(), 502, None, json!("bad gateway")),
            Err(GatewayError::UnexpectedStatus { status: 502, .. })
        ));
    }
}
