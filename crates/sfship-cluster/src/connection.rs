//! Cluster connection selection
//!
//! A connection is secured exactly when both a client key and a client
//! certificate are supplied. This module only formats the connect command;
//! no network call is made here.

use std::path::PathBuf;

use url::Url;

use crate::error::{ClusterError, Result};

/// Well-known Service Fabric management port
pub const MANAGEMENT_PORT: u16 = 19080;

/// Connection parameters for a target cluster
#[derive(Debug, Clone)]
pub struct ClusterConnection {
    /// Management endpoint host (no scheme, no port)
    pub host: String,

    /// Client key file path (PEM)
    pub client_key: Option<PathBuf>,

    /// Client certificate file path (PEM)
    pub client_cert: Option<PathBuf>,
}

impl ClusterConnection {
    /// Create a connection, rejecting blank or half-configured input.
    ///
    /// Supplying exactly one of key/certificate is rejected outright: a
    /// half-configured pair would otherwise silently fall back to an
    /// unsecured connection.
    pub fn new(
        host: impl Into<String>,
        client_key: Option<PathBuf>,
        client_cert: Option<PathBuf>,
    ) -> Result<Self> {
        let host = host.into();
        if host.trim().is_empty() {
            return Err(ClusterError::Config("cluster host is blank".to_string()));
        }

        let key = client_key.filter(|p| !p.as_os_str().is_empty());
        let cert = client_cert.filter(|p| !p.as_os_str().is_empty());
        if key.is_some() != cert.is_some() {
            return Err(ClusterError::Config(
                "client key and certificate must both be set for a secured connection"
                    .to_string(),
            ));
        }

        Ok(Self {
            host,
            client_key: key,
            client_cert: cert,
        })
    }

    /// Build a connection from a resolved management endpoint URL.
    ///
    /// An `https` endpoint requires both key and certificate before any
    /// command text is generated.
    pub fn from_management_endpoint(
        endpoint: &str,
        client_key: Option<PathBuf>,
        client_cert: Option<PathBuf>,
    ) -> Result<Self> {
        let url = Url::parse(endpoint)?;
        let host = url
            .host_str()
            .ok_or_else(|| {
                ClusterError::Config(format!("endpoint '{}' has no host", endpoint))
            })?
            .to_string();

        let connection = Self::new(host, client_key, client_cert)?;
        if url.scheme().eq_ignore_ascii_case("https") && !connection.is_secured() {
            return Err(ClusterError::Config(
                "certificate and key are not specified for a secured management endpoint"
                    .to_string(),
            ));
        }
        Ok(connection)
    }

    /// Whether this is a secured (TLS client certificate) connection
    pub fn is_secured(&self) -> bool {
        self.client_key.is_some() && self.client_cert.is_some()
    }

    /// The `sfctl cluster select` command for this connection.
    ///
    /// Certificate verification is disabled on the secured template; the
    /// management endpoint presents a cluster certificate that is not in
    /// the ambient trust store.
    pub fn connect_command(&self) -> String {
        match (&self.client_key, &self.client_cert) {
            (Some(key), Some(cert)) => format!(
                "sfctl cluster select --endpoint https://{}:{} --key {} --cert {} --no-verify",
                self.host,
                MANAGEMENT_PORT,
                key.display(),
                cert.display()
            ),
            _ => format!(
                "sfctl cluster select --endpoint http://{}:{}",
                self.host, MANAGEMENT_PORT
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secured_iff_both_key_and_cert() {
        let both = ClusterConnection::new(
            "10.0.0.5",
            Some("key.pem".into()),
            Some("cert.pem".into()),
        )
        .unwrap();
        assert!(both.is_secured());

        let neither = ClusterConnection::new("10.0.0.5", None, None).unwrap();
        assert!(!neither.is_secured());
    }

    #[test]
    fn test_half_configured_pair_rejected() {
        let err = ClusterConnection::new("10.0.0.5", Some("key.pem".into()), None).unwrap_err();
        assert!(matches!(err, ClusterError::Config(_)));

        let err = ClusterConnection::new("10.0.0.5", None, Some("cert.pem".into())).unwrap_err();
        assert!(matches!(err, ClusterError::Config(_)));
    }

    #[test]
    fn test_blank_paths_treated_as_absent() {
        let conn =
            ClusterConnection::new("10.0.0.5", Some(PathBuf::new()), Some(PathBuf::new()))
                .unwrap();
        assert!(!conn.is_secured());
    }

    #[test]
    fn test_unsecured_connect_command() {
        let conn = ClusterConnection::new("10.0.0.5", None, None).unwrap();
        assert_eq!(
            conn.connect_command(),
            "sfctl cluster select --endpoint http://10.0.0.5:19080"
        );
    }

    #[test]
    fn test_secured_connect_command_disables_verification() {
        let conn = ClusterConnection::new(
            "cluster.example.io",
            Some("client.key".into()),
            Some("client.crt".into()),
        )
        .unwrap();
        let cmd = conn.connect_command();
        assert!(cmd.starts_with(
            "sfctl cluster select --endpoint https://cluster.example.io:19080"
        ));
        assert!(cmd.contains("--key client.key"));
        assert!(cmd.contains("--cert client.crt"));
        assert!(cmd.ends_with("--no-verify"));
    }

    #[test]
    fn test_https_endpoint_requires_certificates() {
        let err = ClusterConnection::from_management_endpoint(
            "https://cluster.example.io:19080",
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ClusterError::Config(_)));
    }

    #[test]
    fn test_http_endpoint_without_certificates() {
        let conn = ClusterConnection::from_management_endpoint(
            "http://cluster.example.io:19080",
            None,
            None,
        )
        .unwrap();
        assert_eq!(conn.host, "cluster.example.io");
        assert!(!conn.is_secured());
    }

    #[test]
    fn test_blank_host_rejected() {
        assert!(ClusterConnection::new("  ", None, None).is_err());
    }
}
