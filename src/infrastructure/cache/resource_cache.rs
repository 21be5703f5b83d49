use crate::domain::entities::CacheEntry;
use crate::domain::value_objects::{JobId, JobPayload};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

struct CacheState<T> {
    entries: HashMap<JobId, CacheEntry<T>>,
    // 無効化後もバージョンが巻き戻らないよう、IDごとの最大値を保持する。
    // `clear` でも消さないため、一度でも書き込んだIDの数だけ増え続ける。
    high_water: HashMap<JobId, u64>,
}

impl<T> Default for CacheState<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            high_water: HashMap::new(),
        }
    }
}

impl<T: Clone> CacheState<T> {
    fn write(&mut self, job_id: JobId, data: T) -> CacheEntry<T> {
        let version = self.high_water.get(&job_id).copied().unwrap_or(0) + 1;
        self.high_water.insert(job_id.clone(), version);

        let entry = CacheEntry {
            data,
            timestamp: Utc::now(),
            version,
        };
        self.entries.insert(job_id, entry.clone());
        entry
    }
}

/// リソースIDごとの最新スナップショットキャッシュ
pub struct ResourceCache<T: Clone> {
    state: Arc<RwLock<CacheState<T>>>,
}

pub type JobCache = ResourceCache<JobPayload>;

impl<T> ResourceCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(CacheState::default())),
        }
    }

    /// キャッシュからエントリを取得
    pub async fn get(&self, job_id: &JobId) -> Option<CacheEntry<T>> {
        let state = self.state.read().await;
        state.entries.get(job_id).cloned()
    }

    /// エントリを作成または置換し、バージョンを1つ進める
    pub async fn put(&self, job_id: JobId, data: T) -> CacheEntry<T> {
        let mut state = self.state.write().await;
        state.write(job_id, data)
    }

    /// 現在のエントリを元に新しいデータを計算して書き込む
    ///
    /// 読み取りと書き込みは同じロック内で行われる。
    pub async fn put_with<F>(&self, job_id: JobId, f: F) -> CacheEntry<T>
    where
        F: FnOnce(Option<&T>) -> T + Send,
    {
        let mut state = self.state.write().await;
        let data = f(state.entries.get(&job_id).map(|entry| &entry.data));
        state.write(job_id, data)
    }

    /// エントリを削除（ETagには触れない）
    pub async fn invalidate(&self, job_id: &JobId) {
        let mut state = self.state.write().await;
        state.entries.remove(job_id);
    }

    /// 存在しないか、`max_age` より古ければ true
    pub async fn is_stale(&self, job_id: &JobId, max_age: Duration) -> bool {
        let state = self.state.read().await;
        let Some(entry) = state.entries.get(job_id) else {
            return true;
        };

        let max_age = chrono::Duration::from_std(max_age).unwrap_or(chrono::Duration::MAX);
        entry.age(Utc::now()) > max_age
    }

    /// 全エントリを削除
    ///
    /// バージョンの最大値は残すため、再取得後もバージョンは増え続ける。
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.entries.clear();
    }

    /// キャッシュサイズを取得
    pub async fn len(&self) -> usize {
        let state = self.state.read().await;
        state.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<T> Default for ResourceCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for ResourceCache<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job(id: &str) -> JobId {
        JobId::new(id.to_string()).unwrap()
    }

    fn payload(name: &str) -> JobPayload {
        JobPayload::new(json!({ "name": name })).unwrap()
    }

    #[tokio::test]
    async fn test_versions_start_at_one_and_increase() {
        let cache = JobCache::new();

        let mut versions = Vec::new();
        for i in 0..5 {
            let entry = cache.put(job("job-1"), payload(&format!("v{i}"))).await;
            versions.push(entry.version);
        }

        assert_eq!(versions, vec![1, 2, 3, 4, 5]);
        assert_eq!(cache.get(&job("job-1")).await.unwrap().data, payload("v4"));
    }

    #[tokio::test]
    async fn test_versions_are_per_id() {
        let cache = JobCache::new();
        cache.put(job("job-1"), payload("a")).await;
        cache.put(job("job-1"), payload("b")).await;
        let other = cache.put(job("job-2"), payload("c")).await;

        assert_eq!(other.version, 1);
    }

    #[tokio::test]
    async fn test_version_survives_invalidate() {
        let cache = JobCache::new();
        cache.put(job("job-1"), payload("a")).await;
        cache.put(job("job-1"), payload("b")).await;

        cache.invalidate(&job("job-1")).await;
        assert!(cache.get(&job("job-1")).await.is_none());

        let entry = cache.put(job("job-1"), payload("c")).await;
        assert_eq!(entry.version, 3);
    }

    #[tokio::test]
    async fn test_concurrent_puts_get_distinct_versions() {
        let cache = JobCache::new();
        let mut handles = Vec::new();
        for i in 0..20 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                cache.put(job("job-1"), payload(&format!("w{i}"))).await.version
            }));
        }

        let mut versions = Vec::new();
        for handle in handles {
            versions.push(handle.await.unwrap());
        }
        versions.sort_unstable();

        assert_eq!(versions, (1..=20).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn test_put_with_sees_previous_data() {
        let cache = JobCache::new();
        cache
            .put(
                job("job-1"),
                JobPayload::new(json!({"name": "Old", "status": "draft"})).unwrap(),
            )
            .await;

        let fields = json!({"name": "New"}).as_object().cloned().unwrap();
        let entry = cache
            .put_with(job("job-1"), |previous| {
                previous
                    .map(|p| p.merged_with(&fields))
                    .unwrap_or_else(|| JobPayload::from_map(fields.clone()))
            })
            .await;

        assert_eq!(entry.version, 2);
        assert_eq!(entry.data.get("name"), Some(&json!("New")));
        assert_eq!(entry.data.get("status"), Some(&json!("draft")));
    }

    #[tokio::test]
    async fn test_is_stale() {
        let cache = JobCache::new();
        assert!(cache.is_stale(&job("job-2"), Duration::from_secs(1)).await);

        cache.put(job("job-2"), payload("fresh")).await;
        assert!(!cache.is_stale(&job("job-2"), Duration::from_secs(1)).await);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(cache.is_stale(&job("job-2"), Duration::from_millis(10)).await);
        // 古くても読み取りは可能
        assert!(cache.get(&job("job-2")).await.is_some());

        cache.invalidate(&job("job-2")).await;
        assert!(cache.is_stale(&job("job-2"), Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = JobCache::new();
        cache.put(job("job-1"), payload("a")).await;
        cache.put(job("job-2"), payload("b")).await;
        assert_eq!(cache.len().await, 2);

        cache.clear().await;
        assert!(cache.is_empty().await);
        assert_eq!(cache.put(job("job-1"), payload("c")).await.version, 2);
    }
}
