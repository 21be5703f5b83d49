use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// ジョブのペイロード（キャッシュ内では不透明なJSONオブジェクトとして扱う）
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Value", into = "Value")]
pub struct JobPayload(Map<String, Value>);

impl JobPayload {
    pub fn new(value: Value) -> Result<Self, String> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Err("Job payload cannot be null".to_string()),
            other => Err(format!(
                "Job payload must be a JSON object, got {}",
                json_kind(&other)
            )),
        }
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// 部分スナップショットを浅くマージした新しいペイロードを返す
    pub fn merged_with(&self, fields: &Map<String, Value>) -> Self {
        let mut merged = self.0.clone();
        for (key, value) in fields {
            merged.insert(key.clone(), value.clone());
        }
        Self(merged)
    }
}

impl TryFrom<Value> for JobPayload {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<JobPayload> for Value {
    fn from(payload: JobPayload) -> Self {
        Value::Object(payload.0)
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
