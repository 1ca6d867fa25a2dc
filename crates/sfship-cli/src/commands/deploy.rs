//! Deploy command - assemble the deployment script and run it

use std::path::Path;
use std::time::Duration;

use console::style;
use sfship_cluster::{DeployPlan, ScriptRunner};

use crate::error::Result;
use crate::TargetArgs;

/// Run the deploy command
pub async fn run(target: &TargetArgs, workdir: &Path, timeout_secs: u64) -> Result<()> {
    let connection = target.connection()?;
    let deploy_target = target.deploy_target()?;

    println!(
        "{} Deploying {} version {} to {}",
        style("→").blue().bold(),
        style(&deploy_target.application_name).cyan(),
        style(&deploy_target.version).yellow(),
        style(&connection.host).yellow()
    );
    if connection.is_secured() {
        println!("{} Using secured (client certificate) connection", style("→").blue());
    }

    let application_name = deploy_target.application_name.clone();
    let plan = DeployPlan::new(connection, deploy_target);
    let script = plan.script()?;

    let runner = ScriptRunner::new(workdir).with_timeout(Duration::from_secs(timeout_secs));
    let outcome = runner.run(&script).await?;

    println!(
        "{} Successfully deployed {} (exit code {})",
        style("✓").green().bold(),
        style(&application_name).cyan(),
        outcome.exit_code
    );
    Ok(())
}
