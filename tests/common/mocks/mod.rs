pub mod job_gateway;

pub use job_gateway::MockJobGateway;
