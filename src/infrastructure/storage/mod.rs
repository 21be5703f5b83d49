pub mod file_draft_storage;
pub mod memory_draft_storage;

pub use file_draft_storage::FileDraftStorage;
pub use memory_draft_storage::MemoryDraftStorage;
