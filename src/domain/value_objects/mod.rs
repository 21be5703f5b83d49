pub mod draft_id;
pub mod entity_tag;
pub mod job_id;
pub mod job_payload;

pub use draft_id::DraftId;
pub use entity_tag::EntityTag;
pub use job_id::JobId;
pub use job_payload::JobPayload;
