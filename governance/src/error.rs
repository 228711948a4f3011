use conviction_math::MathError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("{caller} is not authorized to {action}")]
    Unauthorized { caller: String, action: &'static str },

    #[error("proposal {0} is no longer accepting votes")]
    ProposalNotActive(String),

    #[error("allocation exceeded: {voter} would commit {requested} of their voting power")]
    AllocationExceeded { voter: String, requested: String },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("proposal {0} not found")]
    ProposalNotFound(String),

    #[error("resource {0} not found")]
    ResourceNotFound(String),

    #[error(transparent)]
    Math(#[from] MathError),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("config error: {0}")]
    Config(String),
}
