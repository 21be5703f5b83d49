use crate::application::ports::draft_storage::{DraftStorage, StorageError};
use crate::domain::entities::{Draft, DraftInput};
use crate::domain::value_objects::DraftId;
use crate::infrastructure::storage::MemoryDraftStorage;
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

struct DraftState {
    // 直近に保存したものが先頭
    drafts: Vec<Draft>,
    persistent: bool,
}

/// 未送信の下書きを保持し、変更のたびに永続化するストア
///
/// ストレージのエラーは呼び出し元に返さず、ログに残して処理を続ける。
pub struct DraftStore {
    storage: Arc<dyn DraftStorage>,
    state: RwLock<DraftState>,
}

impl DraftStore {
    pub async fn open(storage: Arc<dyn DraftStorage>) -> Self {
        let (drafts, persistent) = load_drafts(storage.as_ref()).await;
        debug!(count = drafts.len(), persistent, "draft store opened");

        Self {
            storage,
            state: RwLock::new(DraftState { drafts, persistent }),
        }
    }

    /// 永続化しないストア（下書きはプロセス終了で失われる）
    pub fn in_memory() -> Self {
        Self {
            storage: Arc::new(MemoryDraftStorage::new()),
            state: RwLock::new(DraftState {
                drafts: Vec::new(),
                persistent: false,
            }),
        }
    }

    /// 更新日時の新しい順
    pub async fn list(&self) -> Vec<Draft> {
        let state = self.state.read().await;
        let mut drafts = state.drafts.clone();
        drafts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        drafts
    }

    pub async fn get(&self, draft_id: &DraftId) -> Option<Draft> {
        let state = self.state.read().await;
        state
            .drafts
            .iter()
            .find(|draft| &draft.draft_id == draft_id)
            .cloned()
    }

    /// 下書きを保存し、そのIDを返す（IDが無ければ新規発行）
    pub async fn save(&self, input: DraftInput) -> DraftId {
        let draft_id = input.draft_id.unwrap_or_else(DraftId::generate);

        let mut state = self.state.write().await;
        let mut payload = match state
            .drafts
            .iter()
            .position(|draft| draft.draft_id == draft_id)
        {
            Some(index) => state.drafts.remove(index).payload,
            None => serde_json::Map::new(),
        };
        for (key, value) in input.fields {
            payload.insert(key, value);
        }

        state.drafts.insert(
            0,
            Draft {
                draft_id: draft_id.clone(),
                updated_at: Utc::now().timestamp_millis(),
                payload,
            },
        );
        self.persist(&mut state).await;

        draft_id
    }

    /// 存在しないIDは何もしない
    pub async fn delete(&self, draft_id: &DraftId) {
        let mut state = self.state.write().await;
        let before = state.drafts.len();
        state.drafts.retain(|draft| &draft.draft_id != draft_id);
        if state.drafts.len() == before {
            return;
        }
        self.persist(&mut state).await;
    }

    pub async fn clear_all(&self) {
        let mut state = self.state.write().await;
        state.drafts.clear();
        self.persist(&mut state).await;
    }

    /// 下書きを送信し、成功した場合のみ削除する
    ///
    /// 下書きが存在しなければ `Ok(None)`。
    pub async fn complete_submission<F, Fut, T, E>(
        &self,
        draft_id: &DraftId,
        submit: F,
    ) -> Result<Option<T>, E>
    where
        F: FnOnce(Draft) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let Some(draft) = self.get(draft_id).await else {
            return Ok(None);
        };

        let submitted = submit(draft).await?;
        self.delete(draft_id).await;
        Ok(Some(submitted))
    }

    /// ストレージから読み直す（読めなければ現在の状態を保持）
    pub async fn reload(&self) {
        let mut state = self.state.write().await;
        if !state.persistent {
            return;
        }
        match self.storage.read().await {
            Ok(Some(contents)) => match serde_json::from_str::<Vec<Draft>>(&contents) {
                Ok(drafts) => state.drafts = drafts,
                Err(e) => warn!("Ignoring corrupt drafts on reload: {e}"),
            },
            Ok(None) => state.drafts.clear(),
            Err(e) => warn!("Failed to reload drafts: {e}"),
        }
    }

    pub async fn is_persistent(&self) -> bool {
        self.state.read().await.persistent
    }

    async fn persist(&self, state: &mut DraftState) {
        if !state.persistent {
            return;
        }

        let json = match serde_json::to_string(&state.drafts) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize drafts: {e}");
                return;
            }
        };

        match self.storage.write(&json).await {
            Ok(()) => {}
            Err(StorageError::Unavailable(reason)) => {
                warn!(%reason, "Draft storage unavailable; keeping drafts in memory only");
                state.persistent = false;
            }
            Err(e) => warn!("Failed to persist drafts: {e}"),
        }
    }
}

async fn load_drafts(storage: &dyn DraftStorage) -> (Vec<Draft>, bool) {
    match storage.read().await {
        Ok(None) => (Vec::new(), true),
        Ok(Some(contents)) => match serde_json::from_str::<Vec<Draft>>(&contents) {
            Ok(mut drafts) => {
                drafts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
                (drafts, true)
            }
            Err(e) => {
                warn!("Stored drafts are corrupt, starting empty: {e}");
                (Vec::new(), true)
            }
        },
        Err(StorageError::Unavailable(reason)) => {
            warn!(%reason, "Draft storage unavailable; keeping drafts in memory only");
            (Vec::new(), false)
        }
        Err(e) => {
            warn!("Failed to read drafts, starting empty: {e}");
            (Vec::new(), true)
        }
    }
}
