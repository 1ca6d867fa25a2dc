//! Deployment planning and script assembly
//!
//! A deployment is compiled down to one `&&`-joined shell script for the
//! external `sfctl` CLI: connect, check/clean, cd into the package root,
//! upload, provision, then install-or-upgrade. The install/upgrade/skip
//! decision is not made in-process - the script itself checks the cluster
//! remotely and branches, so one idempotent script covers all three states.

use std::path::{Path, PathBuf};

use tracing::info;

use sfship_core::ApplicationManifest;

use crate::connection::ClusterConnection;
use crate::error::{ClusterError, Result};

/// URI scheme prefix every application name must carry
pub const APPLICATION_SCHEME: &str = "fabric:/";

const UPLOAD: &str = "sfctl application upload --path {appId} --show-progress";
const PROVISION: &str = "sfctl application provision --application-type-build-path {appId}";
const CREATE: &str =
    "sfctl application create --app-name {appId} --app-type {appType} --app-version {appVersion}";
const UPGRADE: &str =
    "sfctl application upgrade --app-id {appId} --app-version {appVersion} --parameters [] --mode Monitored";
const REMOVE: &str = "sfctl application delete --application-id {appId}";
const UNPROVISION: &str =
    "sfctl application unprovision --application-type-name {appType} --application-type-version {appVersion}";

/// What the cluster currently reports for an application identity.
///
/// The emitted script discovers the state remotely; this enum captures the
/// policy for each outcome. Version matching is an exact string comparison
/// against the declared target, never a numeric one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployState {
    /// No application with this identity on the cluster
    Absent,
    /// Present and reporting exactly the target version
    PresentSameVersion,
    /// Present with any other version
    PresentDifferentVersion,
}

impl DeployState {
    /// Whether the check/clean branch removes and unregisters the existing
    /// deployment. A version-matching deployment is never removed.
    pub fn cleans_existing(&self) -> bool {
        matches!(self, Self::PresentDifferentVersion)
    }

    /// Whether the install-or-upgrade branch creates a fresh instance
    pub fn creates(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Whether the install-or-upgrade branch runs an upgrade
    pub fn upgrades(&self) -> bool {
        matches!(self, Self::PresentDifferentVersion)
    }

    /// Whether the run is a no-op end to end
    pub fn skips(&self) -> bool {
        matches!(self, Self::PresentSameVersion)
    }

    /// One-line description of the action taken in this state
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Absent => "application absent: register the type and create the instance",
            Self::PresentSameVersion => {
                "target version already running: leave the deployment untouched"
            }
            Self::PresentDifferentVersion => {
                "different version running: remove and unregister the old type, then upgrade"
            }
        }
    }
}

/// The application identity and target version being deployed
#[derive(Debug, Clone)]
pub struct DeployTarget {
    /// Full application name, including the `fabric:/` scheme
    pub application_name: String,

    /// Cluster-unique identity: the name with the scheme stripped
    pub application_id: String,

    /// Application type name
    pub application_type: String,

    /// Declared target version, read from the application manifest
    pub version: String,

    /// Path to `ApplicationManifest.yaml` inside the package
    pub manifest_path: PathBuf,
}

impl DeployTarget {
    /// Build a target from the application manifest on disk.
    ///
    /// The manifest is the source of truth for the target version, so any
    /// version rewrite must have been saved before this call.
    pub fn from_manifest(
        application_name: impl Into<String>,
        application_type: impl Into<String>,
        manifest_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        let application_name = application_name.into();
        let application_id = application_name
            .strip_prefix(APPLICATION_SCHEME)
            .ok_or_else(|| {
                ClusterError::Config(format!(
                    "application name '{}' must start with '{}'",
                    application_name, APPLICATION_SCHEME
                ))
            })?
            .to_string();
        if application_id.is_empty() {
            return Err(ClusterError::Config(
                "application name has no identity after the scheme".to_string(),
            ));
        }

        let application_type = application_type.into();
        if application_type.trim().is_empty() {
            return Err(ClusterError::Config(
                "application type is blank".to_string(),
            ));
        }

        let manifest_path = manifest_path.into();
        let manifest = ApplicationManifest::load(&manifest_path)?;
        let version = manifest.application_type_version()?;

        Ok(Self {
            application_name,
            application_id,
            application_type,
            version,
            manifest_path,
        })
    }

    /// Package root: the manifest path with its last two segments dropped
    /// (`pkg/ApplicationPackage/ApplicationManifest.yaml` -> `pkg`)
    pub fn package_root(&self) -> Result<&Path> {
        self.manifest_path
            .parent()
            .and_then(Path::parent)
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| {
                ClusterError::Config(format!(
                    "manifest path '{}' is too shallow to locate the package root",
                    self.manifest_path.display()
                ))
            })
    }
}

/// An assembled deployment: one connection, one target, one script
#[derive(Debug, Clone)]
pub struct DeployPlan {
    pub connection: ClusterConnection,
    pub target: DeployTarget,
}

impl DeployPlan {
    pub fn new(connection: ClusterConnection, target: DeployTarget) -> Self {
        Self { connection, target }
    }

    /// Assemble the full deployment script.
    ///
    /// The script is logged for audit with credential paths left intact
    /// but is never executed here.
    pub fn script(&self) -> Result<String> {
        let package_root = self.target.package_root()?.display().to_string();

        let parts = [
            self.connection.connect_command(),
            self.check_clean_command(),
            format!("cd {}", package_root),
            self.substitute(UPLOAD),
            self.substitute(PROVISION),
            self.install_or_upgrade_command(),
        ];
        let script = parts.join(" && ");

        info!(
            application = %self.target.application_name,
            version = %self.target.version,
            "assembled deployment script: {}",
            script
        );
        Ok(script)
    }

    /// The check/clean conditional.
    ///
    /// If the identity exists and reports a version other than the target,
    /// the old instance is deleted and its type unregistered so the install
    /// branch can treat the cluster as fresh. A version-matching deployment
    /// is left alone.
    fn check_clean_command(&self) -> String {
        let clean = format!("{} && {}", REMOVE, UNPROVISION);
        self.substitute(&format!(
            "if [ `sfctl application info --application-id {{appId}} | wc -l` != 0 ]; \
             then \
             if [ `sfctl application info --application-id {{appId}} | grep {{appVersion}} | wc -l` == 0 ]; \
             then {clean}; \
             fi; \
             fi"
        ))
    }

    /// The install-or-upgrade conditional: upgrade when a different version
    /// is still present, create when the identity is absent, do nothing
    /// when the target version is already running.
    fn install_or_upgrade_command(&self) -> String {
        self.substitute(&format!(
            "if [ `sfctl application info --application-id {{appId}} | wc -l` != 0 ]; \
             then \
             if [ `sfctl application info --application-id {{appId}} | grep {{appVersion}} | wc -l` == 0 ]; \
             then {UPGRADE}; \
             fi; \
             else {CREATE}; \
             fi"
        ))
    }

    fn substitute(&self, template: &str) -> String {
        template
            .replace("{appId}", &self.target.application_id)
            .replace("{appType}", &self.target.application_type)
            .replace("{appVersion}", &self.target.version)
    }
}
