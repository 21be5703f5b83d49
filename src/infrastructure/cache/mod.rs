pub mod etag_store;
pub mod resource_cache;

pub use etag_store::EtagStore;
pub use resource_cache::{JobCache, ResourceCache};
