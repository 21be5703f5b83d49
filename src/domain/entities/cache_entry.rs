use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// リソースIDごとのキャッシュ済みスナップショット
///
/// `version` は同一IDへの書き込みごとに単調増加する。
/// `timestamp` は鮮度判定にのみ使い、順序付けには使わない。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheEntry<T> {
    pub data: T,
    pub timestamp: DateTime<Utc>,
    pub version: u64,
}

impl<T> CacheEntry<T> {
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.timestamp
    }
}
