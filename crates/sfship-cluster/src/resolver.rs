//! Cloud endpoint lookup seam
//!
//! Resolving a cluster name to its management endpoint is delegated to the
//! hosting environment (cloud SDK, inventory service, static config). This
//! crate only defines the seam; the CLI accepts an explicit endpoint and a
//! host adapter can plug a real resolver in.

use async_trait::async_trait;
use url::Url;

use crate::error::Result;

/// Resolves a cluster name to its public management endpoint URL
#[async_trait]
pub trait EndpointResolver: Send + Sync {
    async fn resolve(&self, cluster_name: &str) -> Result<Url>;
}

/// Resolver over a fixed name-to-endpoint table, useful for tests and
/// static configuration.
#[derive(Debug, Default)]
pub struct StaticEndpointResolver {
    entries: std::collections::HashMap<String, Url>,
}

impl StaticEndpointResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, name: impl Into<String>, endpoint: Url) -> Self {
        self.entries.insert(name.into(), endpoint);
        self
    }
}

#[async_trait]
impl EndpointResolver for StaticEndpointResolver {
    async fn resolve(&self, cluster_name: &str) -> Result<Url> {
        self.entries.get(cluster_name).cloned().ok_or_else(|| {
            crate::error::ClusterError::Config(format!(
                "no management endpoint known for cluster '{}'",
                cluster_name
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_resolver_lookup() {
        let resolver = StaticEndpointResolver::new().with_entry(
            "prod-east",
            Url::parse("https://cluster.example.io:19080").unwrap(),
        );

        let url = resolver.resolve("prod-east").await.unwrap();
        assert_eq!(url.host_str(), Some("cluster.example.io"));
        assert!(resolver.resolve("unknown").await.is_err());
    }
}
