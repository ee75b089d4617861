//! Configuration management CLI commands
//!
//! Each vault subcommand makes that vault the only configured backend.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::io::BufRead;
use std::path::Path;

use super::output::{self, OutputFormat};
use crate::config::{
    AwsConfig, AzureConfig, BackendSelection, Config, GcpConfig, HashiVaultConfig,
};
use crate::credentials::backends::hashicorp::DEFAULT_TOKEN_ENV;

#[derive(Args, Debug)]
#[command(args_conflicts_with_subcommands = true)]
pub struct ConfigArgs {
    /// Remove every vault backend and store credentials in the OS credential store
    #[arg(long)]
    pub use_local_vault_only: bool,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Option<ConfigCommands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ConfigCommands {
    /// Use AWS Secrets Manager
    Aws {
        /// AWS region hosting the secrets
        #[arg(long)]
        region: String,

        /// Description attached to created secrets
        #[arg(long, default_value = "")]
        description: String,

        /// Store every credential under this fixed name
        #[arg(long, default_value = "")]
        secret_name: String,
    },

    /// Use Azure Key Vault
    Azure {
        /// Vault URI, e.g. https://my-vault.vault.azure.net/
        #[arg(long)]
        vault_uri: String,

        #[arg(long, default_value = "")]
        subscription_id: String,

        /// Store every credential under this fixed name
        #[arg(long, default_value = "")]
        secret_name: String,
    },

    /// Use GCP Secret Manager
    Gcp {
        #[arg(long)]
        project_id: String,

        /// Store every credential under this fixed secret id
        #[arg(long, default_value = "")]
        secret_id: String,
    },

    /// Use HashiCorp Vault (KV v2)
    Hashicorp {
        /// Vault address, e.g. http://127.0.0.1:8200
        #[arg(long)]
        vault_uri: String,

        /// Environment variable holding the Vault token
        #[arg(long, default_value = DEFAULT_TOKEN_ENV)]
        environment_token_name: String,

        /// KV v2 mount
        #[arg(long)]
        key_vault_path: String,

        /// Secret path inside the mount
        #[arg(long)]
        secret_path: String,

        /// Data key used for every credential
        #[arg(long, default_value = "")]
        secret_name: String,
    },

    /// Configure file logging
    Logging {
        #[arg(long)]
        enabled: Option<bool>,

        /// Directory for terracreds.log
        #[arg(long)]
        path: Option<String>,
    },

    /// Set the default secret names used by `list`
    Secrets {
        /// Comma separated secret names
        #[arg(long, value_delimiter = ',')]
        secret_list: Vec<String>,
    },

    /// Show current configuration
    View {
        /// Output format (json or yaml)
        #[arg(short, long, default_value = "yaml")]
        output: String,
    },

    /// Show the configuration file path
    Path,
}

/// Handle config commands
pub fn handle_config_command(args: ConfigArgs, config: &mut Config, path: &Path) -> Result<()> {
    if args.use_local_vault_only {
        return use_local_vault_only(config, path, args.yes, &mut std::io::stdin().lock());
    }

    let Some(command) = args.command else {
        anyhow::bail!("Nothing to do. Run 'terracreds config --help' for the available settings");
    };

    match command {
        ConfigCommands::View { output } => {
            output::print_output_format(config, OutputFormat::parse(&output)?)
        }
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
        command => {
            let summary = apply_config_command(config, command);
            config
                .save(path)
                .with_context(|| format!("Failed to write config file: {}", path.display()))?;
            output::print_success(&summary);
            Ok(())
        }
    }
}

/// Apply a settings change, returning a one-line summary.
pub fn apply_config_command(config: &mut Config, command: ConfigCommands) -> String {
    match command {
        ConfigCommands::Aws { region, description, secret_name } => {
            config.select_backend(BackendSelection::Aws(AwsConfig { description, region, secret_name }));
            "AWS Secrets Manager is now the credential backend".to_string()
        }
        ConfigCommands::Azure { vault_uri, subscription_id, secret_name } => {
            config.select_backend(BackendSelection::Azure(AzureConfig {
                secret_name,
                subscription_id,
                vault_uri,
            }));
            "Azure Key Vault is now the credential backend".to_string()
        }
        ConfigCommands::Gcp { project_id, secret_id } => {
            config.select_backend(BackendSelection::Gcp(GcpConfig { project_id, secret_id }));
            "GCP Secret Manager is now the credential backend".to_string()
        }
        ConfigCommands::Hashicorp {
            vault_uri,
            environment_token_name,
            key_vault_path,
            secret_path,
            secret_name,
        } => {
            config.select_backend(BackendSelection::HashiCorp(HashiVaultConfig {
                environment_token_name,
                key_vault_path,
                secret_name,
                secret_path,
                vault_uri,
            }));
            "HashiCorp Vault is now the credential backend".to_string()
        }
        ConfigCommands::Logging { enabled, path } => {
            if let Some(enabled) = enabled {
                config.logging.enabled = enabled;
            }
            if let Some(path) = path {
                config.logging.path = path;
            }
            format!(
                "Logging {} ({})",
                if config.logging.enabled { "enabled" } else { "disabled" },
                if config.logging.path.is_empty() { "." } else { config.logging.path.as_str() }
            )
        }
        ConfigCommands::Secrets { secret_list } => {
            config.secrets =
                secret_list.into_iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
            format!("Default secret list set to {} name(s)", config.secrets.len())
        }
        ConfigCommands::View { .. } | ConfigCommands::Path => String::new(),
    }
}

fn use_local_vault_only<R: BufRead>(
    config: &mut Config,
    path: &Path,
    yes: bool,
    input: &mut R,
) -> Result<()> {
    if config.backend_selection() == BackendSelection::Local {
        output::print_info("No vault backend is configured; the OS credential store is already in use");
        return Ok(());
    }

    if !yes {
        output::print_warning(
            "This removes every vault backend from the configuration. Continue? [y/N]",
        );
        if !confirm(input)? {
            output::print_info("Configuration left unchanged");
            return Ok(());
        }
    }

    config.select_backend(BackendSelection::Local);
    config.save(path).with_context(|| format!("Failed to write config file: {}", path.display()))?;
    output::print_success("Credentials will be stored in the OS credential store");
    Ok(())
}

/// Read one answer line; only `y` or `yes` confirm.
pub fn confirm<R: BufRead>(input: &mut R) -> Result<bool> {
    let mut answer = String::new();
    input.read_line(&mut answer).context("Failed to read confirmation")?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
