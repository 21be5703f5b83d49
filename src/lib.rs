pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
pub mod state;

pub use application::ports::{DraftStorage, GatewayError, JobGateway, PatchResponse};
pub use domain::entities::{
    CacheEntry, Draft, DraftInput, FieldErrors, SubmissionOutcome, SubmissionResult,
};
pub use domain::value_objects::{DraftId, EntityTag, JobId, JobPayload};
pub use shared::{AppConfig, AppError};
pub use state::AppState;

/// ログ設定の初期化
///
/// `RUST_LOG` が無ければ `jobdesk=debug,info` を使う。二重に呼ぶとパニックする。
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jobdesk=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
