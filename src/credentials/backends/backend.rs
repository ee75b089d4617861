//! Vault backend trait and types
//!
//! Defines the lifecycle every remote secret store implements.

use crate::credentials::secret::SecretString;
use crate::errors::{CredsError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type of vault backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VaultKind {
    /// AWS Secrets Manager
    AwsSecretsManager,
    /// Azure Key Vault
    AzureKeyVault,
    /// GCP Secret Manager
    GcpSecretManager,
    /// HashiCorp Vault KV v2
    HashiCorpVault,
    /// In-process map
    Memory,
}

impl VaultKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwsSecretsManager => "aws_secrets_manager",
            Self::AzureKeyVault => "azure_key_vault",
            Self::GcpSecretManager => "gcp_secret_manager",
            Self::HashiCorpVault => "hashicorp_vault",
            Self::Memory => "memory",
        }
    }

    /// Human readable product name, used in error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::AwsSecretsManager => "AWS Secrets Manager",
            Self::AzureKeyVault => "Azure Key Vault",
            Self::GcpSecretManager => "GCP Secret Manager",
            Self::HashiCorpVault => "HashiCorp Vault",
            Self::Memory => "Memory vault",
        }
    }

    /// Whether names addressed on this backend have `.` replaced by `-`.
    pub fn sanitizes_names(&self) -> bool {
        matches!(self, Self::AzureKeyVault | Self::GcpSecretManager)
    }
}

impl FromStr for VaultKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "aws_secrets_manager" => Ok(Self::AwsSecretsManager),
            "azure_key_vault" => Ok(Self::AzureKeyVault),
            "gcp_secret_manager" => Ok(Self::GcpSecretManager),
            "hashicorp_vault" => Ok(Self::HashiCorpVault),
            "memory" => Ok(Self::Memory),
            _ => Err(format!("Unknown vault backend type: {}", s)),
        }
    }
}

impl fmt::Display for VaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which write path a create-or-update took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMethod {
    Created,
    Updated,
}

impl WriteMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Updated => "Updated",
        }
    }
}

impl fmt::Display for WriteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A remote secret store bound to one resolved secret name.
///
/// Handles are built per invocation, used for a single operation and dropped.
/// Implementations must be Send + Sync for use in async contexts.
#[async_trait]
pub trait VaultBackend: Send + Sync + fmt::Debug {
    /// Create or update the secret.
    ///
    /// Probes for the secret first. A `NotFound` probe takes the create path,
    /// a successful probe takes the update path and any other probe error
    /// aborts without writing.
    async fn create(&self, value: &SecretString) -> Result<WriteMethod>;

    /// Remove the secret, or schedule it for removal.
    async fn delete(&self) -> Result<()>;

    /// Raw stored payload, without the response envelope.
    async fn get(&self) -> Result<Vec<u8>>;

    /// Current value of each named secret, in input order. The first failure
    /// aborts the call.
    async fn list(&self, names: &[String]) -> Result<Vec<String>>;

    fn kind(&self) -> VaultKind;

    /// Name this handle addresses, after sanitization.
    fn secret_name(&self) -> &str;
}

/// Interpret the result of an existence probe.
///
/// `NotFound` means absent; any other error is returned unchanged.
pub fn probe_exists<T>(probe: Result<T>) -> Result<bool> {
    match probe {
        Ok(_) => Ok(true),
        Err(CredsError::NotFound { .. }) => Ok(false),
        Err(e) => Err(e),
    }
}
