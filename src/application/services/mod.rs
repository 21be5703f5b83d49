pub mod delta_submission;
pub mod draft_store;
pub mod job_loader;

pub use delta_submission::{DeltaSubmissionService, DeltaSubmissionServiceTrait};
pub use draft_store::DraftStore;
pub use job_loader::JobLoader;
