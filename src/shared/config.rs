use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub sync: SyncConfig,
    pub gateway: GatewayConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// キャッシュを「古い」とみなすまでの時間（ミリ秒）
    pub stale_after_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// 0 の場合はタイムアウトなし
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    pub drafts_entry: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sync: SyncConfig {
                stale_after_ms: 60_000, // 1 minute
            },
            gateway: GatewayConfig {
                request_timeout_ms: 30_000,
            },
            storage: StorageConfig {
                data_dir: default_data_dir(),
                drafts_entry: "po_drafts.json".to_string(),
            },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        // 既定値
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("JOBDESK_DATA_DIR") {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                cfg.storage.data_dir = trimmed.to_string();
            }
        }
        if let Ok(v) = std::env::var("JOBDESK_DRAFTS_ENTRY") {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                cfg.storage.drafts_entry = trimmed.to_string();
            }
        }
        if let Ok(v) = std::env::var("JOBDESK_STALE_AFTER_MS")
            && let Some(value) = parse_u64(&v)
        {
            cfg.sync.stale_after_ms = value;
        }
        if let Ok(v) = std::env::var("JOBDESK_REQUEST_TIMEOUT_MS")
            && let Some(value) = parse_u64(&v)
        {
            cfg.gateway.request_timeout_ms = value;
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.storage.data_dir.trim().is_empty() {
            return Err("Storage data_dir must not be empty".to_string());
        }
        if self.storage.drafts_entry.trim().is_empty() {
            return Err("Storage drafts_entry must not be empty".to_string());
        }
        if self.storage.drafts_entry.contains(['/', '\\']) {
            return Err("Storage drafts_entry must be a file name, not a path".to_string());
        }
        Ok(())
    }

    pub fn drafts_path(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir).join(&self.storage.drafts_entry)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_millis(self.sync.stale_after_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        match self.gateway.request_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|dir| dir.join("jobdesk").to_string_lossy().into_owned())
        .unwrap_or_else(|| "./data".to_string())
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}
