pub mod entities;
pub mod value_objects;

pub use entities::{CacheEntry, DeltaEnvelope, Draft, DraftInput, SubmissionResult};
pub use value_objects::{DraftId, EntityTag, JobId, JobPayload};
