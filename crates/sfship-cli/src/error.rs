//! CLI error types with exit code handling

#![allow(dead_code)] // Some variants/methods are for future use

use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Invalid configuration (connection, identity, credentials)
    #[error("Configuration error: {message}")]
    #[diagnostic(code(sfship::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Malformed or incompatible manifest
    #[error("Manifest error: {message}")]
    #[diagnostic(code(sfship::cli::manifest))]
    Manifest {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Deployment script failed or timed out
    #[error("Deployment failed: {message}")]
    #[diagnostic(code(sfship::cli::execution))]
    Execution { message: String },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(sfship::cli::io))]
    Io { message: String },

    /// Wrapped error for passthrough
    #[error("{message}")]
    #[diagnostic(code(sfship::cli::error))]
    Other { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config { .. } => exit_codes::CONFIG_ERROR,
            CliError::Manifest { .. } => exit_codes::MANIFEST_ERROR,
            CliError::Execution { .. } => exit_codes::EXECUTION_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Other { .. } => exit_codes::ERROR,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a configuration error with help text
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a manifest error
    pub fn manifest(message: impl Into<String>) -> Self {
        Self::Manifest {
            message: message.into(),
            help: None,
        }
    }
}

impl From<sfship_core::CoreError> for CliError {
    fn from(err: sfship_core::CoreError) -> Self {
        use sfship_core::CoreError;
        match err {
            CoreError::Config { message } => CliError::config(message),
            CoreError::Structure { .. } | CoreError::YamlParse(_) => CliError::Manifest {
                message: err.to_string(),
                help: None,
            },
            CoreError::InvalidVersion { .. } | CoreError::MissingField { .. } => {
                CliError::config(err.to_string())
            }
            CoreError::Io(e) => CliError::Io {
                message: e.to_string(),
            },
        }
    }
}

impl From<sfship_cluster::ClusterError> for CliError {
    fn from(err: sfship_cluster::ClusterError) -> Self {
        use sfship_cluster::ClusterError;
        match err {
            ClusterError::Config(message) => CliError::config(message),
            ClusterError::Core(core) => core.into(),
            ClusterError::Endpoint(e) => CliError::config(e.to_string()),
            ClusterError::Execution { .. } | ClusterError::Timeout(_) => CliError::Execution {
                message: err.to_string(),
            },
            ClusterError::Io(e) => CliError::Io {
                message: e.to_string(),
            },
            other => CliError::Other {
                message: other.to_string(),
            },
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_mapping() {
        assert_eq!(CliError::config("x").exit_code(), exit_codes::CONFIG_ERROR);
        assert_eq!(
            CliError::manifest("x").exit_code(),
            exit_codes::MANIFEST_ERROR
        );
        assert_eq!(
            CliError::from(sfship_cluster::ClusterError::Execution { code: 3 }).exit_code(),
            exit_codes::EXECUTION_ERROR
        );
        assert_eq!(
            CliError::from(sfship_cluster::ClusterError::Timeout(60)).exit_code(),
            exit_codes::EXECUTION_ERROR
        );
    }

    #[test]
    fn test_structural_core_error_maps_to_manifest() {
        let core = sfship_core::CoreError::structure("version", "ServiceManifest.yaml");
        assert_eq!(
            CliError::from(core).exit_code(),
            exit_codes::MANIFEST_ERROR
        );
    }
}
