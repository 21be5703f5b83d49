pub mod in_memory_job_gateway;
pub mod timeout_gateway;

pub use in_memory_job_gateway::InMemoryJobGateway;
pub use timeout_gateway::TimeoutGateway;
