//! Script command - assemble and print the deployment script

use console::style;
use sfship_cluster::{DeployPlan, DeployState};

use crate::error::Result;
use crate::TargetArgs;

/// Run the script command
pub fn run(target: &TargetArgs, explain: bool) -> Result<()> {
    let connection = target.connection()?;
    let deploy_target = target.deploy_target()?;

    println!(
        "{} Deployment script for {} version {}",
        style("→").blue().bold(),
        style(&deploy_target.application_name).cyan(),
        style(&deploy_target.version).yellow()
    );

    let plan = DeployPlan::new(connection, deploy_target);
    println!("{}", plan.script()?);

    if explain {
        println!("\n{}", style("Behavior per cluster state:").bold());
        for state in [
            DeployState::Absent,
            DeployState::PresentSameVersion,
            DeployState::PresentDifferentVersion,
        ] {
            println!("  {} {}", style("•").blue(), state.describe());
        }
    }

    Ok(())
}
