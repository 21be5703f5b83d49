use crate::domain::value_objects::{EntityTag, JobId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// ジョブIDごとの最新ETagを保持するストア
///
/// 競合判定はサーバー側で行うため、ここでは常に後勝ちで上書きする。
#[derive(Clone, Default)]
pub struct EtagStore {
    tags: Arc<RwLock<HashMap<JobId, EntityTag>>>,
}

impl EtagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// ETagを取得
    pub async fn get(&self, job_id: &JobId) -> Option<EntityTag> {
        let tags = self.tags.read().await;
        tags.get(job_id).cloned()
    }

    /// ETagを保存
    pub async fn set(&self, job_id: JobId, tag: EntityTag) {
        let mut tags = self.tags.write().await;
        tags.insert(job_id, tag);
    }

    /// ETagを削除
    pub async fn clear(&self, job_id: &JobId) {
        let mut tags = self.tags.write().await;
        tags.remove(job_id);
    }

    /// 全ETagを削除（ログアウト時）
    pub async fn clear_all(&self) {
        let mut tags = self.tags.write().await;
        tags.clear();
    }

    pub async fn has(&self, job_id: &JobId) -> bool {
        let tags = self.tags.read().await;
        tags.contains_key(job_id)
    }

    /// ETagを保持しているジョブIDの一覧（ID順）
    pub async fn list(&self) -> Vec<JobId> {
        let tags = self.tags.read().await;
        let mut ids: Vec<JobId> = tags.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub async fn count(&self) -> usize {
        let tags = self.tags.read().await;
        tags.len()
    }
}
