//! Update-artifacts command - rewrite the manifest pair before packaging

use std::path::PathBuf;

use console::style;
use sfship_core::{
    update_artifacts, CredentialStore, EnvCredentialStore, UpdateOptions, VersionField,
};

use crate::error::{CliError, Result};

/// Arguments for the update-artifacts command
pub struct UpdateArgs {
    pub service_manifest: PathBuf,
    pub application_manifest: PathBuf,
    pub field: String,
    pub value: Option<String>,
    pub image_tag: Option<String>,
    pub registry_credential: Option<String>,
    pub password_encrypted: bool,
    pub env_credential: Option<String>,
}

/// Run the update-artifacts command
pub fn run(args: UpdateArgs) -> Result<()> {
    let field: VersionField = args
        .field
        .parse()
        .map_err(|e: String| CliError::config(e))?;

    let mut options =
        UpdateOptions::new(&args.service_manifest, &args.application_manifest);
    options.field = field;
    options.service_value = args.value.clone();
    options.application_value = args.value.clone();
    options.image_tag = args.image_tag.clone();

    let store = EnvCredentialStore;
    if let Some(id) = &args.registry_credential {
        options.registry_credential = Some(store.resolve(id)?);
        options.password_encrypted = args.password_encrypted;
    }
    if let Some(id) = &args.env_credential {
        options.environment_credential = Some(store.resolve(id)?);
    }

    update_artifacts(&options)?;

    println!(
        "{} Updated {} and {} ({} component{})",
        style("✓").green().bold(),
        style(args.service_manifest.display()).cyan(),
        style(args.application_manifest.display()).cyan(),
        style(field).yellow(),
        match &args.value {
            Some(v) => format!(" set to {}", v),
            None => " incremented".to_string(),
        }
    );
    Ok(())
}
