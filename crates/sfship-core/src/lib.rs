//! sfship Core - manifest model and version rewriting for the Service Fabric
//! deployment tool
//!
//! This crate provides the foundational types used throughout sfship:
//! - `ServiceManifest` / `ApplicationManifest`: the descriptor pair
//! - `VersionField`: positional addressing into three-part versions
//! - `CredentialMaterial`: secrets consumed during artifact updates
//! - `update_artifacts`: the coordinated pair rewrite before packaging

pub mod artifacts;
pub mod credentials;
pub mod document;
pub mod error;
pub mod manifest;
pub mod version;

pub use artifacts::{update_artifacts, UpdateOptions};
pub use credentials::{CredentialMaterial, CredentialStore, EnvCredentialStore};
pub use error::{CoreError, Result};
pub use manifest::{ApplicationManifest, ServiceManifest};
pub use version::{rewrite_component, VersionField};
