//! CLI argument parsing using clap derive

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use sfm_client::{ClientOptions, ORG_SERVICE_URL_ENV, PERSONAL_ACCESS_TOKEN_ENV};
use uuid::Uuid;

/// Default ledger location, relative to the working directory
pub const DEFAULT_STATE_PATH: &str = ".sfm/state.toml";

/// Secure File Manager - Reconcile Azure DevOps secure files from TOML manifests
#[derive(Parser, Debug)]
#[command(name = "sfm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path of the state ledger
    #[arg(long, global = true, default_value = DEFAULT_STATE_PATH)]
    pub state: PathBuf,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Organisation connection settings
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Organisation service URL, e.g. https://dev.azure.com/my-org
    #[arg(long, global = true, env = ORG_SERVICE_URL_ENV)]
    pub org_service_url: Option<String>,

    /// Personal access token
    #[arg(long, global = true, env = PERSONAL_ACCESS_TOKEN_ENV, hide_env_values = true)]
    pub personal_access_token: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    pub timeout: u64,

    /// Product token appended to the user agent
    #[arg(long, global = true)]
    pub product: Option<String>,
}

impl ConnectionArgs {
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            org_service_url: self.org_service_url.clone(),
            personal_access_token: self.personal_access_token.clone(),
            timeout: Duration::from_secs(self.timeout),
            product: self.product.clone(),
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Create, update or replace the secure file a manifest declares
    ///
    /// The resulting state is recorded in the ledger under the label.
    ///
    /// Examples:
    ///   sfm apply signing.toml
    ///   sfm apply signing.toml --label release-signing
    Apply {
        /// Manifest to apply
        manifest: PathBuf,

        /// Ledger label (defaults to the manifest file stem)
        #[arg(long)]
        label: Option<String>,
    },

    /// Show what apply would do, using only the ledger
    Plan {
        /// Manifest to plan
        manifest: PathBuf,

        /// Ledger label (defaults to the manifest file stem)
        #[arg(long)]
        label: Option<String>,
    },

    /// Show a secure file and its pipeline authorization
    Read {
        /// Project ID
        #[arg(long)]
        project: Uuid,

        /// Secure file ID
        #[arg(long)]
        id: Uuid,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Deauthorize and delete the secure file recorded under a label
    Delete {
        /// Ledger label
        label: String,
    },

    /// Print the content fingerprint of a manifest without contacting the server
    Fingerprint {
        /// Manifest to fingerprint
        manifest: PathBuf,
    },
}
