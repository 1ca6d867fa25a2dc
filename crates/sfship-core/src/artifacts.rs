//! Coordinated update of the service/application manifest pair
//!
//! Runs the version rewrites and credential injections a build performs
//! right before packaging, keeping the application's recorded reference to
//! the service version in lockstep with the application-level target.

use std::path::PathBuf;

use tracing::info;

use crate::credentials::CredentialMaterial;
use crate::error::Result;
use crate::manifest::{ApplicationManifest, ServiceManifest};
use crate::version::VersionField;

/// Options for the artifact update operation
#[derive(Debug, Clone)]
pub struct UpdateOptions {
    /// Path to `ServiceManifest.yaml`
    pub service_manifest: PathBuf,

    /// Path to `ApplicationManifest.yaml`
    pub application_manifest: PathBuf,

    /// Which version component to rewrite
    pub field: VersionField,

    /// Explicit value for the service-level version component
    /// (None = increment)
    pub service_value: Option<String>,

    /// Explicit value for the application-level version component
    /// (None = increment). Supply the same value as `service_value` to keep
    /// the application's service reference consistent with the service's
    /// own version.
    pub application_value: Option<String>,

    /// Explicit container image tag (None = increment a numeric tag)
    pub image_tag: Option<String>,

    /// Registry credentials to inject into the application manifest
    pub registry_credential: Option<CredentialMaterial>,

    /// Whether the registry password is stored encrypted
    pub password_encrypted: bool,

    /// `KEY=VALUE` material to declare as environment variables
    pub environment_credential: Option<CredentialMaterial>,
}

impl UpdateOptions {
    /// Create options for a manifest pair with default rewrite behavior
    /// (increment the minor component, no credential injection)
    pub fn new(service_manifest: impl Into<PathBuf>, application_manifest: impl Into<PathBuf>) -> Self {
        Self {
            service_manifest: service_manifest.into(),
            application_manifest: application_manifest.into(),
            field: VersionField::default(),
            service_value: None,
            application_value: None,
            image_tag: None,
            registry_credential: None,
            password_encrypted: false,
            environment_credential: None,
        }
    }

    /// Rewrite `field` to `value` in both manifests (lockstep targets)
    pub fn with_version(mut self, field: VersionField, value: impl Into<String>) -> Self {
        let value = value.into();
        self.field = field;
        self.service_value = Some(value.clone());
        self.application_value = Some(value);
        self
    }

    /// Inject registry credentials into the application manifest
    pub fn with_registry_credential(
        mut self,
        credential: CredentialMaterial,
        password_encrypted: bool,
    ) -> Self {
        self.registry_credential = Some(credential);
        self.password_encrypted = password_encrypted;
        self
    }

    /// Declare environment variables from `KEY=VALUE` credential material
    pub fn with_environment(mut self, credential: CredentialMaterial) -> Self {
        self.environment_credential = Some(credential);
        self
    }
}

/// Update the manifest pair on disk.
///
/// The service manifest is rewritten and saved first, then the application
/// manifest. A failure while the application manifest is being rewritten
/// leaves the already-saved service manifest in place - there is no
/// rollback across the pair.
pub fn update_artifacts(options: &UpdateOptions) -> Result<()> {
    let mut service = ServiceManifest::load(&options.service_manifest)?;
    service.bump_version(options.field, options.service_value.as_deref())?;
    service.bump_image_tag(options.image_tag.as_deref())?;
    if let Some(env) = &options.environment_credential {
        service.inject_environment(env)?;
    }
    service.save()?;
    info!(
        manifest = %options.service_manifest.display(),
        version = %service.version()?,
        "service manifest updated"
    );

    let mut application = ApplicationManifest::load(&options.application_manifest)?;
    application.bump_type_version(options.field, options.application_value.as_deref())?;
    application.set_service_ref_version(options.field, options.application_value.as_deref())?;
    match &options.registry_credential {
        Some(CredentialMaterial::UsernamePassword { username, password }) => {
            application.inject_registry_credentials(
                username,
                password,
                options.password_encrypted,
            )?;
        }
        Some(CredentialMaterial::EnvFile { .. }) => {
            return Err(crate::error::CoreError::config(
                "registry credential must be a username/password pair",
            ));
        }
        None => {}
    }
    if let Some(env) = &options.environment_credential {
        application.inject_environment(env)?;
    }
    application.save()?;
    info!(
        manifest = %options.application_manifest.display(),
        version = %application.application_type_version()?,
        "application manifest updated"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const SERVICE_MANIFEST: &str = r#"
name: FooServicePkg
version: "1.0.0"
codePackages:
  - name: Code
    version: "1.0.0"
    entryPoint:
      containerHost:
        imageName: registry.example.io/foo:42
"#;

    const APPLICATION_MANIFEST: &str = r#"
applicationTypeName: FooType
applicationTypeVersion: "1.0.0"
serviceImport:
  serviceManifestRef:
    name: FooServicePkg
    version: "1.0.0"
  policies:
    containerHostPolicies:
      codePackageRef: Code
"#;

    fn write_pair(dir: &TempDir) -> (PathBuf, PathBuf) {
        let service = dir.path().join("ServiceManifest.yaml");
        let application = dir.path().join("ApplicationManifest.yaml");
        let mut f = std::fs::File::create(&service).unwrap();
        f.write_all(SERVICE_MANIFEST.as_bytes()).unwrap();
        let mut f = std::fs::File::create(&application).unwrap();
        f.write_all(APPLICATION_MANIFEST.as_bytes()).unwrap();
        (service, application)
    }

    #[test]
    fn test_pair_update_keeps_reference_in_lockstep() {
        let dir = TempDir::new().unwrap();
        let (service_path, application_path) = write_pair(&dir);

        let options = UpdateOptions::new(&service_path, &application_path)
            .with_version(VersionField::Major, "2");
        update_artifacts(&options).unwrap();

        let service = ServiceManifest::load(&service_path).unwrap();
        let application = ApplicationManifest::load(&application_path).unwrap();
        assert_eq!(service.version().unwrap(), "2.0.0");
        assert_eq!(application.application_type_version().unwrap(), "2.0.0");
        assert_eq!(
            application.service_ref_version().unwrap(),
            service.version().unwrap()
        );
    }

    #[test]
    fn test_pair_update_is_idempotent_with_explicit_targets() {
        let dir = TempDir::new().unwrap();
        let (service_path, application_path) = write_pair(&dir);

        let mut options = UpdateOptions::new(&service_path, &application_path)
            .with_version(VersionField::Minor, "7");
        options.image_tag = Some("43".into());

        update_artifacts(&options).unwrap();
        let first_service = std::fs::read_to_string(&service_path).unwrap();
        let first_application = std::fs::read_to_string(&application_path).unwrap();

        update_artifacts(&options).unwrap();
        assert_eq!(std::fs::read_to_string(&service_path).unwrap(), first_service);
        assert_eq!(
            std::fs::read_to_string(&application_path).unwrap(),
            first_application
        );

        let service = ServiceManifest::load(&service_path).unwrap();
        assert_eq!(service.version().unwrap(), "1.7.0");
    }

    #[test]
    fn test_credential_injection_end_to_end() {
        let dir = TempDir::new().unwrap();
        let (service_path, application_path) = write_pair(&dir);

        let options = UpdateOptions::new(&service_path, &application_path)
            .with_version(VersionField::Patch, "9")
            .with_registry_credential(
                CredentialMaterial::UsernamePassword {
                    username: "svc".into(),
                    password: "s3cret".into(),
                },
                false,
            )
            .with_environment(CredentialMaterial::from_env_file("API_KEY=abc\n"));
        update_artifacts(&options).unwrap();

        let application = std::fs::read_to_string(&application_path).unwrap();
        assert!(application.contains("accountName: svc"));
        assert!(application.contains("API_KEY"));
        assert!(application.contains("PARAPHRASE"));

        let service = std::fs::read_to_string(&service_path).unwrap();
        assert!(service.contains("[API_KEY]"));
    }

    #[test]
    fn test_structural_failure_aborts_before_service_save() {
        let dir = TempDir::new().unwrap();
        let service_path = dir.path().join("ServiceManifest.yaml");
        std::fs::write(&service_path, "name: Foo\n").unwrap();
        let application_path = dir.path().join("ApplicationManifest.yaml");
        std::fs::write(&application_path, APPLICATION_MANIFEST).unwrap();

        let options = UpdateOptions::new(&service_path, &application_path)
            .with_version(VersionField::Major, "2");
        assert!(update_artifacts(&options).is_err());

        // Application manifest untouched.
        assert_eq!(
            std::fs::read_to_string(&application_path).unwrap(),
            APPLICATION_MANIFEST
        );
    }
}
