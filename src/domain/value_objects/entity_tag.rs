use serde::{Deserialize, Serialize};
use std::fmt;

/// サーバーが発行する同時実行制御トークン（ETag）
///
/// 中身は解釈しない。ヘッダー表現との変換のみを扱う。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityTag(String);

impl EntityTag {
    pub fn new(value: String) -> Result<Self, String> {
        if value.trim().is_empty() {
            return Err("Entity tag cannot be empty".to_string());
        }
        Ok(Self(value))
    }

    /// `ETag` ヘッダー値から生成（`W/` プレフィックスと引用符を除去）
    pub fn from_header(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        let without_weak = trimmed.strip_prefix("W/").unwrap_or(trimmed);
        let unquoted = without_weak
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(without_weak);
        Self::new(unquoted.to_string())
    }

    /// `If-Match` ヘッダー用の表現
    pub fn to_header_value(&self) -> String {
        format!("\"{}\"", self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EntityTag {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for EntityTag {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<EntityTag> for String {
    fn from(value: EntityTag) -> Self {
        value.0
    }
}
