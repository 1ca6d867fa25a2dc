//! sfship CLI - deploy packaged applications to Service Fabric clusters

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod exit_codes;

use error::CliError;

#[derive(Parser)]
#[command(name = "sfship")]
#[command(author = "sfship Contributors")]
#[command(version)]
#[command(about = "Deploy packaged applications to Service Fabric clusters", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

/// Cluster and application target, shared by `script` and `deploy`
#[derive(Args, Debug, Clone)]
struct TargetArgs {
    /// Application name, including the fabric:/ scheme (fabric:/Foo)
    #[arg(long)]
    app_name: String,

    /// Application type name
    #[arg(long)]
    app_type: String,

    /// Path to ApplicationManifest.yaml inside the application package
    #[arg(long)]
    manifest: PathBuf,

    /// Cluster management endpoint URL (http://host:19080 or https://...)
    /// - mutually exclusive with --host
    #[arg(long, conflicts_with = "host")]
    endpoint: Option<String>,

    /// Cluster host (no scheme, no port)
    #[arg(long)]
    host: Option<String>,

    /// Client key file for a secured connection
    #[arg(long, env = "SFSHIP_CLIENT_KEY")]
    client_key: Option<PathBuf>,

    /// Client certificate file for a secured connection
    #[arg(long, env = "SFSHIP_CLIENT_CERT")]
    client_cert: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble the deployment script and print it (dry run)
    Script {
        #[command(flatten)]
        target: TargetArgs,

        /// Also explain what the script does in each cluster state
        #[arg(long)]
        explain: bool,
    },

    /// Assemble the deployment script and run it
    Deploy {
        #[command(flatten)]
        target: TargetArgs,

        /// Working directory for the script (default: current directory)
        #[arg(long, default_value = ".")]
        workdir: PathBuf,

        /// Overall deadline in seconds
        #[arg(long, default_value_t = 900)]
        timeout: u64,
    },

    /// Rewrite versions and credentials in the manifest pair before packaging
    UpdateArtifacts {
        /// Path to ServiceManifest.yaml
        #[arg(long)]
        service_manifest: PathBuf,

        /// Path to ApplicationManifest.yaml
        #[arg(long)]
        application_manifest: PathBuf,

        /// Version component to rewrite: major, minor or patch
        #[arg(long, default_value = "minor")]
        field: String,

        /// Explicit value for the component in both manifests
        /// (omit to increment the existing component)
        #[arg(long)]
        value: Option<String>,

        /// Explicit container image tag (omit to increment a numeric tag)
        #[arg(long)]
        image_tag: Option<String>,

        /// Credential id for registry credentials, resolved from the
        /// environment ({ID}_USERNAME / {ID}_PASSWORD)
        #[arg(long)]
        registry_credential: Option<String>,

        /// The registry password is stored encrypted
        #[arg(long)]
        password_encrypted: bool,

        /// Credential id for a KEY=VALUE secret file, resolved from the
        /// environment ({ID}_FILE)
        #[arg(long)]
        env_credential: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_target(false)
        .init();

    let result: error::Result<()> = match cli.command {
        Commands::Script { target, explain } => commands::script::run(&target, explain),

        Commands::Deploy {
            target,
            workdir,
            timeout,
        } => commands::deploy::run(&target, &workdir, timeout).await,

        Commands::UpdateArtifacts {
            service_manifest,
            application_manifest,
            field,
            value,
            image_tag,
            registry_credential,
            password_encrypted,
            env_credential,
        } => commands::update::run(commands::update::UpdateArgs {
            service_manifest,
            application_manifest,
            field,
            value,
            image_tag,
            registry_credential,
            password_encrypted,
            env_credential,
        }),
    };

    if let Err(err) = result {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

impl TargetArgs {
    /// Build the connection from either an endpoint URL or a bare host
    fn connection(&self) -> Result<sfship_cluster::ClusterConnection, CliError> {
        match (&self.endpoint, &self.host) {
            (Some(endpoint), _) => Ok(sfship_cluster::ClusterConnection::from_management_endpoint(
                endpoint,
                self.client_key.clone(),
                self.client_cert.clone(),
            )?),
            (None, Some(host)) => Ok(sfship_cluster::ClusterConnection::new(
                host,
                self.client_key.clone(),
                self.client_cert.clone(),
            )?),
            (None, None) => Err(CliError::config_with_help(
                "no cluster given",
                "pass --endpoint <URL> or --host <HOST>",
            )),
        }
    }

    fn deploy_target(&self) -> Result<sfship_cluster::DeployTarget, CliError> {
        Ok(sfship_cluster::DeployTarget::from_manifest(
            &self.app_name,
            &self.app_type,
            &self.manifest,
        )?)
    }
}
