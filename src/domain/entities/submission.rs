use crate::domain::entities::{CacheEntry, FieldErrors};
use crate::domain::value_objects::{EntityTag, JobPayload};
use serde::Serialize;
use std::fmt;

/// 部分更新の結果。競合・検証エラー・通信失敗はすべて値として返す
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionResult {
    Success {
        entry: CacheEntry<JobPayload>,
        new_token: EntityTag,
    },
    Conflict {
        reason: String,
    },
    ValidationFailure {
        field_errors: FieldErrors,
    },
    NetworkFailure {
        cause: String,
    },
    /// 同じジョブへの送信が進行中
    Busy,
}

impl SubmissionResult {
    pub fn outcome(&self) -> SubmissionOutcome {
        match self {
            SubmissionResult::Success { .. } => SubmissionOutcome::Succeeded,
            SubmissionResult::Conflict { .. } => SubmissionOutcome::Conflicted,
            SubmissionResult::ValidationFailure { .. } => SubmissionOutcome::Rejected,
            SubmissionResult::NetworkFailure { .. } => SubmissionOutcome::Failed,
            SubmissionResult::Busy => SubmissionOutcome::Busy,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionResult::Success { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Succeeded,
    Conflicted,
    Rejected,
    Failed,
    Busy,
}

impl fmt::Display for SubmissionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SubmissionOutcome::Succeeded => "succeeded",
            SubmissionOutcome::Conflicted => "conflicted",
            SubmissionOutcome::Rejected => "rejected",
            SubmissionOutcome::Failed => "failed",
            SubmissionOutcome::Busy => "busy",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPhase {
    Idle,
    Submitting,
}
