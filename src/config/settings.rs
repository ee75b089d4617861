//! # Configuration Settings
//!
//! Defines the on-disk configuration structure. Keys are camelCase so that
//! files written by earlier releases of the helper load unchanged.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default bound on a single vault call.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Main helper configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// File logging
    pub logging: LoggingConfig,

    /// Upper bound on each vault call, in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,

    #[serde(skip_serializing_if = "AwsConfig::is_empty")]
    pub aws: AwsConfig,

    #[serde(skip_serializing_if = "AzureConfig::is_empty")]
    pub azure: AzureConfig,

    #[serde(skip_serializing_if = "GcpConfig::is_empty")]
    pub gcp: GcpConfig,

    #[serde(rename = "hcvault", skip_serializing_if = "HashiVaultConfig::is_empty")]
    pub hashicorp: HashiVaultConfig,

    /// Default secret names for `list`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub secrets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    /// Directory that receives `terracreds.log`
    pub path: String,
}

/// AWS Secrets Manager block. Populated when `region` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AwsConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub region: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub secret_name: String,
}

/// Azure Key Vault block. Populated when `vaultUri` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AzureConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub secret_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subscription_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub vault_uri: String,
}

/// GCP Secret Manager block. Populated when `projectId` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GcpConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub project_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub secret_id: String,
}

/// HashiCorp Vault block. Populated when `vaultUri` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HashiVaultConfig {
    /// Name of the environment variable holding the Vault token
    #[serde(skip_serializing_if = "String::is_empty")]
    pub environment_token_name: String,
    /// KV v2 mount
    #[serde(skip_serializing_if = "String::is_empty")]
    pub key_vault_path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub secret_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub secret_path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub vault_uri: String,
}

impl AwsConfig {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn is_populated(&self) -> bool {
        !self.region.is_empty()
    }
}

impl AzureConfig {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn is_populated(&self) -> bool {
        !self.vault_uri.is_empty()
    }
}

impl GcpConfig {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn is_populated(&self) -> bool {
        !self.project_id.is_empty()
    }
}

impl HashiVaultConfig {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn is_populated(&self) -> bool {
        !self.vault_uri.is_empty()
    }
}

/// The single active storage choice.
///
/// On disk every provider has its own block; in memory exactly one selection
/// is active. [`Config::backend_selection`] reads it in priority order and
/// [`Config::select_backend`] writes it, clearing every other block.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendSelection {
    /// Native OS credential store
    Local,
    Aws(AwsConfig),
    Azure(AzureConfig),
    Gcp(GcpConfig),
    HashiCorp(HashiVaultConfig),
}

impl BackendSelection {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Aws(_) => "aws",
            Self::Azure(_) => "azure",
            Self::Gcp(_) => "gcp",
            Self::HashiCorp(_) => "hashicorp",
        }
    }
}

impl Config {
    /// Active backend, resolved AWS, then Azure, then GCP, then HashiCorp.
    pub fn backend_selection(&self) -> BackendSelection {
        if self.aws.is_populated() {
            BackendSelection::Aws(self.aws.clone())
        } else if self.azure.is_populated() {
            BackendSelection::Azure(self.azure.clone())
        } else if self.gcp.is_populated() {
            BackendSelection::Gcp(self.gcp.clone())
        } else if self.hashicorp.is_populated() {
            BackendSelection::HashiCorp(self.hashicorp.clone())
        } else {
            BackendSelection::Local
        }
    }

    /// Names of every populated provider block, in priority order.
    pub fn populated_backends(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.aws.is_populated() {
            names.push("aws");
        }
        if self.azure.is_populated() {
            names.push("azure");
        }
        if self.gcp.is_populated() {
            names.push("gcp");
        }
        if self.hashicorp.is_populated() {
            names.push("hashicorp");
        }
        names
    }

    /// Make `selection` the only configured backend.
    pub fn select_backend(&mut self, selection: BackendSelection) {
        self.aws = AwsConfig::default();
        self.azure = AzureConfig::default();
        self.gcp = GcpConfig::default();
        self.hashicorp = HashiVaultConfig::default();

        match selection {
            BackendSelection::Local => {}
            BackendSelection::Aws(aws) => self.aws = aws,
            BackendSelection::Azure(azure) => self.azure = azure,
            BackendSelection::Gcp(gcp) => self.gcp = gcp,
            BackendSelection::HashiCorp(hashicorp) => self.hashicorp = hashicorp,
        }
    }

    pub fn vault_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }
}
