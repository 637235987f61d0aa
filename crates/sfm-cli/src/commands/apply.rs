//! Apply and plan command implementations
//!
//! Both read the manifest and the ledger entry for its label. `plan` stops
//! there; `apply` reconciles and records the result.

use std::path::Path;

use colored::Colorize;
use sfm_core::{Plan, plan};
use sfm_model::{DesiredState, Manifest};

use super::label_for;
use crate::cli::ConnectionArgs;
use crate::error::Result;
use crate::ledger::Ledger;
use crate::session::Session;

fn load_desired(manifest: &Path) -> Result<DesiredState> {
    Ok(Manifest::load(manifest)?.into_desired()?)
}

fn print_plan(plan: &Plan) {
    match plan {
        Plan::Create => println!("   {} create", "+".green()),
        Plan::Replace { reasons } => {
            println!("   {} replace", "-/+".yellow());
            for reason in reasons {
                println!("     {} {}", "-".yellow(), reason);
            }
        }
        Plan::Update { changes } => {
            println!("   {} update in place", "~".yellow());
            for change in changes {
                println!("     {} {}", "-".yellow(), change);
            }
        }
        Plan::Noop => println!("   {} no changes", "=".dimmed()),
    }
}

/// Run the plan command
///
/// Compares the manifest with the ledger only; the server is not contacted,
/// so remote drift is not visible here.
pub fn run_plan(state_path: &Path, manifest: &Path, label: Option<&str>) -> Result<()> {
    let label = label_for(manifest, label)?;
    let desired = load_desired(manifest)?;
    let ledger = Ledger::load(state_path)?;

    let plan = plan(ledger.get(&label), &desired)?;

    println!(
        "{} Plan for {} ({})",
        "=>".blue().bold(),
        label.cyan(),
        desired.name
    );
    print_plan(&plan);
    Ok(())
}

/// Run the apply command
///
/// The manifest and ledger are checked before connecting.
pub fn run_apply(
    connection: &ConnectionArgs,
    state_path: &Path,
    manifest: &Path,
    label: Option<&str>,
) -> Result<()> {
    let label = label_for(manifest, label)?;
    let desired = load_desired(manifest)?;
    let mut ledger = Ledger::load(state_path)?;
    let session = Session::connect(connection)?;

    println!(
        "{} Applying {} ({})",
        "=>".blue().bold(),
        label.cyan(),
        manifest.display()
    );

    let report = session.block_on(session.engine().apply(ledger.get(&label), &desired))?;

    for action in &report.actions {
        println!("   {} {}", "-".green(), action);
    }

    ledger.insert(label.as_str(), report.state.clone());
    ledger.save(state_path)?;

    println!(
        "{} {}: {} ({}), pipelines {}",
        "OK".green().bold(),
        report.plan.verb(),
        report.state.name,
        report.state.id,
        if report.state.allow_access {
            "authorized".green()
        } else {
            "not authorized".dimmed()
        }
    );
    Ok(())
}
