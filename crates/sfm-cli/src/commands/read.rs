//! Read command implementation

use colored::Colorize;
use sfm_core::ReadOutcome;
use uuid::Uuid;

use crate::cli::ConnectionArgs;
use crate::error::Result;
use crate::session::Session;

/// Run the read command
///
/// Absence is reported, not treated as a failure. With `--json` an absent
/// file prints `null`.
pub fn run_read(connection: &ConnectionArgs, project: Uuid, id: Uuid, json: bool) -> Result<()> {
    let session = Session::connect(connection)?;
    let outcome = session.block_on(session.engine().read(id, project))?;

    if json {
        let observed = match &outcome {
            ReadOutcome::Present(observed) => Some(observed),
            ReadOutcome::Absent => None,
        };
        println!("{}", serde_json::to_string_pretty(&observed)?);
        return Ok(());
    }

    let ReadOutcome::Present(observed) = outcome else {
        println!(
            "{} Secure file {} does not exist in project {}",
            "ABSENT".yellow().bold(),
            id,
            project
        );
        return Ok(());
    };

    println!("{} {}", "Secure file".bold(), observed.name().cyan());
    println!("   id:         {}", observed.id);
    println!("   project:    {}", observed.project_id);
    println!(
        "   pipelines:  {}",
        if observed.allow_access() {
            "authorized".green()
        } else {
            "not authorized".dimmed()
        }
    );
    if let Some(modified) = observed.file.modified_on.or(observed.file.created_on) {
        println!("   modified:   {}", modified.to_rfc3339());
    }
    if !observed.file.properties.is_empty() {
        println!("   properties:");
        for (key, value) in &observed.file.properties {
            println!("     {} = {}", key, value);
        }
    }
    Ok(())
}
