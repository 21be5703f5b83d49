use crate::domain::value_objects::{EntityTag, JobPayload};
use serde::{Deserialize, Serialize};

/// 取得APIが返すジョブとそのトークン
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobSnapshot {
    pub payload: JobPayload,
    pub token: EntityTag,
}

/// 部分更新APIが返すスナップショット
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotBody {
    Full(JobPayload),
    /// 変更されたフィールドのみ。キャッシュ済みペイロードへマージされる
    Partial(JobPayload),
}
