//! # Command Line Interface
//!
//! Terraform calls the helper as `terracreds get|store|forget <hostname>`;
//! the remaining commands manage credentials and configuration by hand.

pub mod config_cmd;
pub mod generate;
pub mod list;
pub mod output;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::{config_path, Config};
use crate::credentials::{
    credential_store_for, CredentialHelper, DeleteMode, Platform, SdkConnector,
    TokenSource,
};
use crate::errors::CredsError;
use crate::observability::init_logging;

const MODIFY_DENIED: &str = "You do not have permission to modify this credential";
const VIEW_DENIED: &str = "You do not have permission to view this credential";

#[derive(Parser, Debug)]
#[command(name = "terracreds")]
#[command(about = "A credential helper for Terraform")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create or update a credential
    #[command(visible_alias = "update")]
    Create {
        /// Name of the credential, usually a Terraform hostname
        #[arg(short, long)]
        name: String,

        /// Token value; read as {"token": ...} from stdin when omitted
        #[arg(short, long, short_alias = 't')]
        secret: Option<String>,
    },

    /// Delete a credential
    Delete {
        #[arg(short, long)]
        name: String,
    },

    /// Forget a credential (terraform logout)
    Forget { hostname: String },

    /// Print a credential as {"token": ...} (terraform init/plan/apply)
    Get { hostname: String },

    /// Store a credential read from stdin (terraform login)
    Store { hostname: String },

    /// Print the values of several credentials
    List(list::ListArgs),

    /// Manage the configuration file
    Config(config_cmd::ConfigArgs),

    /// Install terracreds as the Terraform credentials helper
    Generate(generate::GenerateArgs),
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let path = config_path(cli.config.as_deref())?;
    let mut config = Config::load_or_create(&path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    let _guard = init_logging(cli.verbose, &config.logging)?;

    match cli.command {
        Commands::Config(args) => {
            config_cmd::handle_config_command(args, &mut config, &path)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Generate(args) => {
            generate::handle_generate_command(args)?;
            Ok(ExitCode::SUCCESS)
        }
        command => {
            let store = credential_store_for(Platform::current());
            let helper = CredentialHelper::new(&config, store.as_ref(), &SdkConnector);

            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            execute(command, &helper, &config, &mut stdin.lock(), &mut stdout.lock()).await
        }
    }
}

/// Run one credential command against `helper`.
///
/// Machine-readable output goes to `stdout`; status lines go to stderr.
pub async fn execute<R: Read, W: Write>(
    command: Commands,
    helper: &CredentialHelper<'_>,
    config: &Config,
    stdin: &mut R,
    stdout: &mut W,
) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Create { name, secret } => {
            let source = match secret {
                Some(value) => TokenSource::Inline(value.into()),
                None => TokenSource::FromStdin,
            };
            match helper.create(&name, source, stdin).await {
                Ok(outcome) => {
                    output::print_success(&format!(
                        "{} the credential object '{}'",
                        outcome.method, outcome.name
                    ));
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => denied_or(e, MODIFY_DENIED),
            }
        }

        Commands::Store { hostname } => match helper.create(&hostname, TokenSource::FromStdin, stdin).await {
            Ok(_) => Ok(ExitCode::SUCCESS),
            Err(e) => denied_or(e, MODIFY_DENIED),
        },

        Commands::Get { hostname } => match helper.get(&hostname).await {
            Ok(envelope) => {
                stdout.write_all(&envelope)?;
                writeln!(stdout)?;
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => denied_or(e, VIEW_DENIED),
        },

        Commands::Delete { name } => match helper.delete(&name, DeleteMode::Explicit).await {
            Ok(name) => {
                output::print_success(&format!("The credential object '{}' has been removed", name));
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => denied_or(e, MODIFY_DENIED),
        },

        // Terraform treats any output from forget as an error; the failure is logged.
        Commands::Forget { hostname } => match helper.delete(&hostname, DeleteMode::Forget).await {
            Ok(_) => Ok(ExitCode::SUCCESS),
            Err(_) => Ok(ExitCode::FAILURE),
        },

        Commands::List(args) => {
            let names = args.names(config)?;
            let values = match helper.list(&names).await {
                Ok(values) => values,
                Err(e) => return denied_or(e, VIEW_DENIED),
            };
            let rendered = list::render(&names, &values, args.format(), &args.override_replace_string)?;
            writeln!(stdout, "{}", rendered)?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Config(_) | Commands::Generate(_) => {
            anyhow::bail!("Not a credential command")
        }
    }
}

/// Report access-denied failures with `message`; everything else propagates.
fn denied_or(error: CredsError, message: &str) -> anyhow::Result<ExitCode> {
    if error.is_access_denied() {
        output::print_error(message);
        return Ok(ExitCode::FAILURE);
    }
    Err(error.into())
}
