pub mod cache;
pub mod gateway;
pub mod storage;
