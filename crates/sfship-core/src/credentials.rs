//! Credential material and the credential-store seam
//!
//! Secrets are resolved by an external store, consumed once to populate
//! manifest fields or command parameters, and never persisted or logged by
//! this crate.

use crate::error::{CoreError, Result};

/// Plaintext credential material handed over by a [`CredentialStore`]
#[derive(Clone)]
pub enum CredentialMaterial {
    /// Registry account credentials
    UsernamePassword { username: String, password: String },

    /// Multi-line `KEY=VALUE` content from a secret file
    EnvFile { lines: Vec<String> },
}

impl CredentialMaterial {
    /// Parse secret-file content into `KEY=VALUE` lines, dropping blanks.
    pub fn from_env_file(content: &str) -> Self {
        let lines = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        Self::EnvFile { lines }
    }

    /// Variable names declared by env-file material, in file order.
    ///
    /// Each line contributes its key side, trimmed. Lines without a `=` are
    /// taken whole, matching how half-formed entries were historically
    /// consumed.
    pub fn variable_names(&self) -> Vec<String> {
        match self {
            Self::UsernamePassword { .. } => Vec::new(),
            Self::EnvFile { lines } => lines
                .iter()
                .map(|line| line.split('=').next().unwrap_or(line).trim().to_string())
                .collect(),
        }
    }
}

// Keep secrets out of Debug output.
impl std::fmt::Debug for CredentialMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UsernamePassword { username, .. } => f
                .debug_struct("UsernamePassword")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::EnvFile { lines } => f
                .debug_struct("EnvFile")
                .field("lines", &lines.len())
                .finish(),
        }
    }
}

/// External credential lookup, keyed by an opaque identifier
pub trait CredentialStore {
    fn resolve(&self, id: &str) -> Result<CredentialMaterial>;
}

/// Credential store backed by environment variables (CI/CD friendly)
///
/// An id `REGISTRY` resolves to either `REGISTRY_USERNAME` /
/// `REGISTRY_PASSWORD`, or `REGISTRY_FILE` pointing at a `KEY=VALUE`
/// secret file.
#[derive(Debug, Default)]
pub struct EnvCredentialStore;

impl CredentialStore for EnvCredentialStore {
    fn resolve(&self, id: &str) -> Result<CredentialMaterial> {
        let username_var = format!("{}_USERNAME", id);
        let password_var = format!("{}_PASSWORD", id);

        if let (Ok(username), Ok(password)) =
            (std::env::var(&username_var), std::env::var(&password_var))
        {
            return Ok(CredentialMaterial::UsernamePassword { username, password });
        }

        let file_var = format!("{}_FILE", id);
        if let Ok(path) = std::env::var(&file_var) {
            let content = std::fs::read_to_string(&path)?;
            return Ok(CredentialMaterial::from_env_file(&content));
        }

        Err(CoreError::config(format!(
            "credential '{}' not found: set {} and {}, or {}",
            id, username_var, password_var, file_var
        )))
    }
}
