//! Error types for sfship-cluster

use thiserror::Error;

/// Result type for cluster operations
pub type Result<T> = std::result::Result<T, ClusterError>;

/// Errors that can occur while planning or running a deployment
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClusterError {
    /// Invalid connection or target configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Manifest error from the core crate
    #[error(transparent)]
    Core(#[from] sfship_core::CoreError),

    /// Endpoint URL could not be parsed
    #[error("cannot determine cluster management endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    /// The deployment script exited non-zero
    #[error("deployment script failed with exit code {code}")]
    Execution { code: i32 },

    /// The deployment script was killed after the deadline
    #[error("deployment script timed out after {0}s")]
    Timeout(u64),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
