use peer_review_allocation_config::ConfigError;
use peer_review_allocation_engine::AllocationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("failed to install logging {0}")]
    Logging(#[from] peer_review_allocation_telemetry::TryInitError),
    #[error("failed to read fixture {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse fixture {0}")]
    Json(#[from] serde_json::Error),
    #[error("allocation failed {0}")]
    Allocation(#[from] AllocationError),
}
