//! The descriptor pair: service and application manifests
//!
//! Both manifests follow the same lifecycle: read from a UTF-8 YAML file at
//! construction, mutated in memory via explicit operations, persisted back
//! to the same path on an explicit `save()`. A missing field aborts the
//! operation with a structural error - a malformed descriptor is never
//! patched around.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::credentials::CredentialMaterial;
use crate::document::{
    mapping_at_path_mut, set_string_at_path, string_at_path, value_at_path_mut,
};
use crate::error::{CoreError, Result};
use crate::version::{rewrite_component, VersionField};

/// Sentinel parameter carried alongside injected environment variables,
/// used to pass a passphrase into the application at deploy time.
pub const PASSPHRASE_PARAMETER: &str = "PARAPHRASE";

const IMAGE_PATH: &str = "codePackages.0.entryPoint.containerHost.imageName";
const SERVICE_REF_PATH: &str = "serviceImport.serviceManifestRef.version";
const HOST_POLICIES_PATH: &str = "serviceImport.policies.containerHostPolicies";

/// Registry credentials block injected under the container host policies
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryCredentials<'a> {
    account_name: &'a str,
    password: &'a str,
    password_encrypted: bool,
}

#[derive(Debug, Serialize)]
struct EnvironmentVariable {
    name: String,
    value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Parameter {
    name: String,
    default_value: String,
}

/// A loaded `ServiceManifest.yaml`
#[derive(Debug, Clone)]
pub struct ServiceManifest {
    path: PathBuf,
    file: String,
    doc: Value,
}

impl ServiceManifest {
    /// Load a service manifest from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = path.display().to_string();
        let content = std::fs::read_to_string(&path)?;
        let doc: Value = serde_yaml::from_str(&content)?;
        if !doc.is_mapping() {
            return Err(CoreError::structure("(root)", &file));
        }
        Ok(Self { path, file, doc })
    }

    /// The service's own version
    pub fn version(&self) -> Result<String> {
        string_at_path(&self.doc, "version", &self.file)
    }

    /// Rewrite the service version and propagate it to every code package.
    ///
    /// The code-package version must always equal the service version, so
    /// both are written from the same rewritten string.
    pub fn bump_version(&mut self, field: VersionField, value: Option<&str>) -> Result<()> {
        let current = self.version()?;
        let next = rewrite_component(&current, field, value)?;
        set_string_at_path(&mut self.doc, "version", &next, &self.file)?;

        if let Some(packages) = value_at_path_mut(&mut self.doc, "codePackages")
            .and_then(Value::as_sequence_mut)
        {
            for package in packages {
                if let Some(map) = package.as_mapping_mut() {
                    map.insert(
                        Value::String("version".into()),
                        Value::String(next.clone()),
                    );
                }
            }
        }
        Ok(())
    }

    /// Replace the tag of the container image reference.
    ///
    /// Without an explicit tag, a numeric existing tag is incremented by
    /// one; a non-numeric or missing tag must be overwritten explicitly.
    pub fn bump_image_tag(&mut self, tag: Option<&str>) -> Result<()> {
        let image = string_at_path(&self.doc, IMAGE_PATH, &self.file)?;
        let (base, current_tag) = match image.split_once(':') {
            Some((base, tag)) => (base.to_string(), Some(tag.to_string())),
            None => (image.clone(), None),
        };

        let next_tag = match tag {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => {
                let current = current_tag.as_deref().unwrap_or("");
                let numeric: u64 = current.parse().map_err(|_| CoreError::InvalidVersion {
                    version: image.clone(),
                    component: current.to_string(),
                    message: "image tag is not numeric and no explicit tag was given"
                        .to_string(),
                })?;
                (numeric + 1).to_string()
            }
        };

        set_string_at_path(
            &mut self.doc,
            IMAGE_PATH,
            &format!("{}:{}", base, next_tag),
            &self.file,
        )
    }

    /// Declare one environment variable per `KEY=VALUE` line under the
    /// first code package. Values are parameter references (`[NAME]`),
    /// never the secret content itself.
    pub fn inject_environment(&mut self, material: &CredentialMaterial) -> Result<()> {
        let names = material.variable_names();
        let entries = names
            .iter()
            .map(|n| env_variable_entry(n))
            .collect::<Result<Vec<_>>>()?;

        let package = mapping_at_path_mut(&mut self.doc, "codePackages.0", &self.file)?;
        package.insert(
            Value::String("environmentVariables".into()),
            Value::Sequence(entries),
        );
        Ok(())
    }

    /// Write the document back to its original path
    pub fn save(&self) -> Result<()> {
        let content = serde_yaml::to_string(&self.doc)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn document(&self) -> &Value {
        &self.doc
    }
}

/// A loaded `ApplicationManifest.yaml`
#[derive(Debug, Clone)]
pub struct ApplicationManifest {
    path: PathBuf,
    file: String,
    doc: Value,
}

impl ApplicationManifest {
    /// Load an application manifest from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = path.display().to_string();
        let content = std::fs::read_to_string(&path)?;
        let doc: Value = serde_yaml::from_str(&content)?;
        if !doc.is_mapping() {
            return Err(CoreError::structure("(root)", &file));
        }
        Ok(Self { path, file, doc })
    }

    /// The declared application type name
    pub fn application_type_name(&self) -> Result<String> {
        string_at_path(&self.doc, "applicationTypeName", &self.file)
    }

    /// The declared application type version - the target version consumed
    /// by deployment planning
    pub fn application_type_version(&self) -> Result<String> {
        string_at_path(&self.doc, "applicationTypeVersion", &self.file)
    }

    /// Rewrite the application type version
    pub fn bump_type_version(&mut self, field: VersionField, value: Option<&str>) -> Result<()> {
        let current = self.application_type_version()?;
        let next = rewrite_component(&current, field, value)?;
        set_string_at_path(&mut self.doc, "applicationTypeVersion", &next, &self.file)
    }

    /// Rewrite the recorded reference to the service manifest's version
    pub fn set_service_ref_version(
        &mut self,
        field: VersionField,
        value: Option<&str>,
    ) -> Result<()> {
        let current = string_at_path(&self.doc, SERVICE_REF_PATH, &self.file)?;
        let next = rewrite_component(&current, field, value)?;
        set_string_at_path(&mut self.doc, SERVICE_REF_PATH, &next, &self.file)
    }

    /// The recorded service manifest version reference
    pub fn service_ref_version(&self) -> Result<String> {
        string_at_path(&self.doc, SERVICE_REF_PATH, &self.file)
    }

    /// Attach container registry credentials to the container host policies
    pub fn inject_registry_credentials(
        &mut self,
        username: &str,
        password: &str,
        password_encrypted: bool,
    ) -> Result<()> {
        let credentials = serde_yaml::to_value(RepositoryCredentials {
            account_name: username,
            password,
            password_encrypted,
        })?;

        let policies = mapping_at_path_mut(&mut self.doc, HOST_POLICIES_PATH, &self.file)?;
        policies.insert(Value::String("repositoryCredentials".into()), credentials);
        Ok(())
    }

    /// Declare one parameter and one environment override per `KEY=VALUE`
    /// line, plus the fixed passphrase sentinel pair.
    pub fn inject_environment(&mut self, material: &CredentialMaterial) -> Result<()> {
        let mut names = material.variable_names();
        names.push(PASSPHRASE_PARAMETER.to_string());

        let parameters = names
            .iter()
            .map(|n| parameter_entry(n))
            .collect::<Result<Vec<_>>>()?;
        let overrides = names
            .iter()
            .map(|n| env_variable_entry(n))
            .collect::<Result<Vec<_>>>()?;

        let root = self
            .doc
            .as_mapping_mut()
            .ok_or_else(|| CoreError::structure("(root)", &self.file))?;
        root.insert(
            Value::String("parameters".into()),
            Value::Sequence(parameters),
        );

        let mut override_block = Mapping::new();
        override_block.insert(
            Value::String("codePackageRef".into()),
            Value::String("Code".into()),
        );
        override_block.insert(
            Value::String("environmentVariables".into()),
            Value::Sequence(overrides),
        );

        let import = mapping_at_path_mut(&mut self.doc, "serviceImport", &self.file)?;
        import.insert(
            Value::String("environmentOverrides".into()),
            Value::Mapping(override_block),
        );
        Ok(())
    }

    /// Write the document back to its original path
    pub fn save(&self) -> Result<()> {
        let content = serde_yaml::to_string(&self.doc)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn document(&self) -> &Value {
        &self.doc
    }
}

fn env_variable_entry(name: &str) -> Result<Value> {
    // The value is a parameter reference, never the secret content.
    Ok(serde_yaml::to_value(EnvironmentVariable {
        name: name.to_string(),
        value: format!("[{}]", name),
    })?)
}

fn parameter_entry(name: &str) -> Result<Value> {
    Ok(serde_yaml::to_value(Parameter {
        name: name.to_string(),
        default_value: String::new(),
    })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::value_at_path;
    use std::io::Write;
    use tempfile::NamedTempFile;

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

    fn write_fixture(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_service_version_propagates_to_code_packages() {
        let f = write_fixture(SERVICE_MANIFEST);
        let mut manifest = ServiceManifest::load(f.path()).unwrap();

        manifest
            .bump_version(VersionField::Minor, Some("5"))
            .unwrap();

        assert_eq!(manifest.version().unwrap(), "1.5.0");
        assert_eq!(
            value_at_path(manifest.document(), "codePackages.0.version")
                .and_then(Value::as_str),
            Some("1.5.0")
        );
    }

    #[test]
    fn test_image_tag_explicit_and_incremented() {
        let f = write_fixture(SERVICE_MANIFEST);
        let mut manifest = ServiceManifest::load(f.path()).unwrap();

        manifest.bump_image_tag(Some("99")).unwrap();
        assert_eq!(
            value_at_path(manifest.document(), super::IMAGE_PATH).and_then(Value::as_str),
            Some("registry.example.io/foo:99")
        );

        manifest.bump_image_tag(None).unwrap();
        assert_eq!(
            value_at_path(manifest.document(), super::IMAGE_PATH).and_then(Value::as_str),
            Some("registry.example.io/foo:100")
        );
    }

    #[test]
    fn test_image_tag_non_numeric_requires_explicit() {
        let f = write_fixture(&SERVICE_MANIFEST.replace(":42", ":latest"));
        let mut manifest = ServiceManifest::load(f.path()).unwrap();
        assert!(manifest.bump_image_tag(None).is_err());
        assert!(manifest.bump_image_tag(Some("7")).is_ok());
    }

    #[test]
    fn test_service_env_injection() {
        let f = write_fixture(SERVICE_MANIFEST);
        let mut manifest = ServiceManifest::load(f.path()).unwrap();
        let material = CredentialMaterial::from_env_file("DB_HOST=db\nDB_PASS=x\n");

        manifest.inject_environment(&material).unwrap();

        let vars = value_at_path(manifest.document(), "codePackages.0.environmentVariables")
            .and_then(Value::as_sequence)
            .unwrap();
        assert_eq!(vars.len(), 2);
        assert_eq!(
            value_at_path(manifest.document(), "codePackages.0.environmentVariables.0.value")
                .and_then(Value::as_str),
            Some("[DB_HOST]")
        );
    }

    #[test]
    fn test_application_type_version_bump() {
        let f = write_fixture(APPLICATION_MANIFEST);
        let mut manifest = ApplicationManifest::load(f.path()).unwrap();

        manifest.bump_type_version(VersionField::Patch, None).unwrap();
        assert_eq!(manifest.application_type_version().unwrap(), "1.0.1");
        assert_eq!(manifest.application_type_name().unwrap(), "FooType");
    }

    #[test]
    fn test_service_ref_version_rewrite() {
        let f = write_fixture(APPLICATION_MANIFEST);
        let mut manifest = ApplicationManifest::load(f.path()).unwrap();

        manifest
            .set_service_ref_version(VersionField::Major, Some("3"))
            .unwrap();
        assert_eq!(manifest.service_ref_version().unwrap(), "3.0.0");
    }

    #[test]
    fn test_registry_credentials_injection() {
        let f = write_fixture(APPLICATION_MANIFEST);
        let mut manifest = ApplicationManifest::load(f.path()).unwrap();

        manifest
            .inject_registry_credentials("svc-account", "s3cret", false)
            .unwrap();

        let creds = value_at_path(
            manifest.document(),
            "serviceImport.policies.containerHostPolicies.repositoryCredentials",
        )
        .unwrap();
        assert_eq!(
            value_at_path(creds, "accountName").and_then(Value::as_str),
            Some("svc-account")
        );
        assert_eq!(
            value_at_path(creds, "passwordEncrypted").and_then(Value::as_bool),
            Some(false)
        );
    }

    #[test]
    fn test_application_env_injection_adds_passphrase_sentinel() {
        let f = write_fixture(APPLICATION_MANIFEST);
        let mut manifest = ApplicationManifest::load(f.path()).unwrap();
        let material = CredentialMaterial::from_env_file("API_KEY=abc\n");

        manifest.inject_environment(&material).unwrap();

        let params = value_at_path(manifest.document(), "parameters")
            .and_then(Value::as_sequence)
            .unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(
            value_at_path(manifest.document(), "parameters.1.name").and_then(Value::as_str),
            Some(PASSPHRASE_PARAMETER)
        );
        assert_eq!(
            value_at_path(
                manifest.document(),
                "serviceImport.environmentOverrides.codePackageRef"
            )
            .and_then(Value::as_str),
            Some("Code")
        );
    }

    #[test]
    fn test_missing_version_field_is_structural() {
        let f = write_fixture("name: Foo\n");
        let mut manifest = ServiceManifest::load(f.path()).unwrap();
        let err = manifest.bump_version(VersionField::Major, None).unwrap_err();
        assert!(matches!(err, CoreError::Structure { .. }));
    }

    #[test]
    fn test_save_round_trip() {
        let f = write_fixture(SERVICE_MANIFEST);
        let mut manifest = ServiceManifest::load(f.path()).unwrap();
        manifest.bump_version(VersionField::Major, Some("2")).unwrap();
        manifest.save().unwrap();

        let reloaded = ServiceManifest::load(f.path()).unwrap();
        assert_eq!(reloaded.version().unwrap(), "2.0.0");
    }
}
