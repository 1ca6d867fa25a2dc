//! sfship Cluster - cluster integration for sfship
//!
//! This crate provides:
//! - **Connection**: secured/unsecured cluster connection selection and
//!   the `sfctl cluster select` command
//! - **Planning**: the install/upgrade/skip policy compiled into one
//!   idempotent deployment script
//! - **Execution**: timed, output-streamed execution of the script via an
//!   external shell
//! - **Resolver seam**: cloud lookup of a cluster's management endpoint

pub mod connection;
pub mod error;
pub mod exec;
pub mod plan;
pub mod resolver;

pub use connection::ClusterConnection;
pub use error::{ClusterError, Result};
pub use exec::{ExecOutcome, ScriptRunner, SecretFile};
pub use plan::{DeployPlan, DeployState, DeployTarget};
pub use resolver::{EndpointResolver, StaticEndpointResolver};
