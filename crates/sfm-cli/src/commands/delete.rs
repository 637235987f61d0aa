//! Delete command implementation

use std::path::Path;

use colored::Colorize;
use sfm_model::humanise_list;
use tracing::warn;

use crate::cli::ConnectionArgs;
use crate::error::{CliError, Result};
use crate::ledger::Ledger;
use crate::session::Session;

/// Run the delete command
///
/// A file that is already gone still has its ledger entry removed.
pub fn run_delete(connection: &ConnectionArgs, state_path: &Path, label: &str) -> Result<()> {
    let mut ledger = Ledger::load(state_path)?;

    let Some(recorded) = ledger.get(label).cloned() else {
        let known: Vec<&str> = ledger.labels().collect();
        let hint = if known.is_empty() {
            "the ledger is empty".to_string()
        } else {
            format!("known labels: {}", humanise_list(&known))
        };
        return Err(CliError::user(format!(
            "No secure file recorded under {label:?} ({hint})"
        )));
    };

    let session = Session::connect(connection)?;
    match session.block_on(session.engine().delete(recorded.id, recorded.project_id)) {
        Ok(()) => println!(
            "{} Deleted secure file {} ({})",
            "OK".green().bold(),
            recorded.name,
            recorded.id
        ),
        Err(e) if e.is_not_found() => {
            warn!(label, id = %recorded.id, error = %e, "Secure file already gone");
            println!(
                "{} Secure file {} ({}) was already gone",
                "OK".yellow().bold(),
                recorded.name,
                recorded.id
            );
        }
        Err(e) => return Err(e.into()),
    }

    ledger.remove(label);
    ledger.save(state_path)?;
    Ok(())
}
