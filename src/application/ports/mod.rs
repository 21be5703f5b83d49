pub mod draft_storage;
pub mod job_gateway;

pub use draft_storage::{DraftStorage, StorageError};
pub use job_gateway::{GatewayError, JobGateway, PatchResponse};
