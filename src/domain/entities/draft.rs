use crate::domain::value_objects::DraftId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 未送信の下書き（発注書など）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub draft_id: DraftId,
    /// エポックミリ秒
    pub updated_at: i64,
    #[serde(default)]
    pub payload: Map<String, Value>,
}

impl Draft {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.payload.get(name)
    }
}

/// `DraftStore::save` への入力。`draft_id` が無ければ新規作成
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftInput {
    pub draft_id: Option<DraftId>,
    pub fields: Map<String, Value>,
}

impl DraftInput {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self {
            draft_id: None,
            fields,
        }
    }

    pub fn for_draft(draft_id: DraftId, fields: Map<String, Value>) -> Self {
        Self {
            draft_id: Some(draft_id),
            fields,
        }
    }
}
