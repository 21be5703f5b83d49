pub mod cache_entry;
pub mod delta;
pub mod draft;
pub mod field_errors;
pub mod job_snapshot;
pub mod submission;

pub use cache_entry::CacheEntry;
pub use delta::DeltaEnvelope;
pub use draft::{Draft, DraftInput};
pub use field_errors::{FieldErrors, NON_FIELD_ERRORS};
pub use job_snapshot::{JobSnapshot, SnapshotBody};
pub use submission::{SubmissionOutcome, SubmissionPhase, SubmissionResult};
