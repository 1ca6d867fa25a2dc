//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    #[error("Malformed manifest: {path} not found in {file}")]
    Structure { path: String, file: String },

    #[error("Invalid version component '{component}' in '{version}': {message}")]
    InvalidVersion {
        version: String,
        component: String,
        message: String,
    },

    #[error("Failed to parse manifest: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing required field: {field}")]
    MissingField { field: String },
}

impl CoreError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a structural error for a missing path in a manifest
    pub fn structure(path: impl Into<String>, file: impl Into<String>) -> Self {
        Self::Structure {
            path: path.into(),
            file: file.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
