//! Backend resolution
//!
//! Turns the configuration snapshot into at most one vault backend
//! description, and connects descriptions to live clients.

use super::backends::{
    AzureKeyVaultBackend, AzureSettings, HashiCorpSettings, HashiCorpVaultBackend, VaultBackend,
    VaultKind,
};
use super::name::sanitize_secret_name;
use super::secret::SecretString;
use crate::config::{BackendSelection, Config};
use crate::errors::{CredsError, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

/// A resolved vault backend, with the final secret name it addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultBackendSpec {
    Aws { region: String, description: String, secret_name: String },
    /// `secret_name` is already sanitized
    Azure { vault_uri: String, secret_name: String },
    /// `secret_id` is already sanitized
    Gcp { project_id: String, secret_id: String },
    HashiCorp { vault_uri: String, token_env: String, mount: String, path: String, key: String },
}

impl VaultBackendSpec {
    pub fn kind(&self) -> VaultKind {
        match self {
            Self::Aws { .. } => VaultKind::AwsSecretsManager,
            Self::Azure { .. } => VaultKind::AzureKeyVault,
            Self::Gcp { .. } => VaultKind::GcpSecretManager,
            Self::HashiCorp { .. } => VaultKind::HashiCorpVault,
        }
    }

    pub fn secret_name(&self) -> &str {
        match self {
            Self::Aws { secret_name, .. } | Self::Azure { secret_name, .. } => secret_name,
            Self::Gcp { secret_id, .. } => secret_id,
            Self::HashiCorp { key, .. } => key,
        }
    }
}

fn override_or(name: &str, fallback: &str) -> String {
    if name.is_empty() {
        fallback.to_string()
    } else {
        name.to_string()
    }
}

/// Pick the vault backend for this invocation, or `None` for the OS store.
///
/// Priority is AWS, Azure, GCP, HashiCorp. A backend's own secret name
/// override replaces `canonical_name`.
pub fn resolve_backend(config: &Config, canonical_name: &str) -> Option<VaultBackendSpec> {
    let populated = config.populated_backends();
    if populated.len() > 1 {
        warn!(
            active = %populated[0],
            ignored = ?&populated[1..],
            "More than one vault backend is configured; using the highest priority one"
        );
    }

    let spec = match config.backend_selection() {
        BackendSelection::Local => return None,
        BackendSelection::Aws(aws) => VaultBackendSpec::Aws {
            region: aws.region,
            description: aws.description,
            secret_name: override_or(&aws.secret_name, canonical_name),
        },
        BackendSelection::Azure(azure) => VaultBackendSpec::Azure {
            vault_uri: azure.vault_uri,
            secret_name: sanitize_secret_name(&override_or(&azure.secret_name, canonical_name)),
        },
        BackendSelection::Gcp(gcp) => VaultBackendSpec::Gcp {
            project_id: gcp.project_id,
            secret_id: sanitize_secret_name(&override_or(&gcp.secret_id, canonical_name)),
        },
        BackendSelection::HashiCorp(hc) => VaultBackendSpec::HashiCorp {
            vault_uri: hc.vault_uri,
            token_env: hc.environment_token_name,
            mount: hc.key_vault_path,
            path: hc.secret_path,
            key: override_or(&hc.secret_name, canonical_name),
        },
    };

    debug!(backend = %spec.kind(), secret = %spec.secret_name(), "Resolved vault backend");
    Some(spec)
}

/// Builds live clients from backend descriptions.
#[async_trait]
pub trait BackendConnector: Send + Sync {
    async fn connect(&self, spec: &VaultBackendSpec) -> Result<Box<dyn VaultBackend>>;
}

/// Connects to the real vendor services.
#[derive(Debug, Default, Clone, Copy)]
pub struct SdkConnector;

#[async_trait]
impl BackendConnector for SdkConnector {
    async fn connect(&self, spec: &VaultBackendSpec) -> Result<Box<dyn VaultBackend>> {
        match spec {
            VaultBackendSpec::Aws { region, description, secret_name } => {
                connect_aws(region, description, secret_name).await
            }
            VaultBackendSpec::Azure { vault_uri, secret_name } => Ok(Box::new(
                AzureKeyVaultBackend::new(AzureSettings::new(vault_uri, secret_name))?,
            )),
            VaultBackendSpec::Gcp { project_id, secret_id } => connect_gcp(project_id, secret_id).await,
            VaultBackendSpec::HashiCorp { vault_uri, token_env, mount, path, key } => {
                let token_env = if token_env.is_empty() {
                    super::backends::hashicorp::DEFAULT_TOKEN_ENV
                } else {
                    token_env.as_str()
                };
                let token = std::env::var(token_env).map_err(|_| {
                    CredsError::config(format!(
                        "HashiCorp Vault token variable '{}' is not set",
                        token_env
                    ))
                })?;

                Ok(Box::new(HashiCorpVaultBackend::new(HashiCorpSettings {
                    address: vault_uri.clone(),
                    token: SecretString::new(token),
                    mount: mount.clone(),
                    path: path.clone(),
                    key: key.clone(),
                })?))
            }
        }
    }
}

#[cfg(feature = "aws")]
async fn connect_aws(region: &str, description: &str, secret_name: &str) -> Result<Box<dyn VaultBackend>> {
    use super::backends::{AwsSecretsManagerBackend, AwsSettings};

    let backend = AwsSecretsManagerBackend::new(AwsSettings {
        region: region.to_string(),
        description: description.to_string(),
        secret_name: secret_name.to_string(),
    })
    .await?;
    Ok(Box::new(backend))
}

#[cfg(not(feature = "aws"))]
async fn connect_aws(_region: &str, _description: &str, _secret_name: &str) -> Result<Box<dyn VaultBackend>> {
    Err(CredsError::config(
        "AWS Secrets Manager is configured but terracreds was built without the `aws` feature",
    ))
}

#[cfg(feature = "gcp")]
async fn connect_gcp(project_id: &str, secret_id: &str) -> Result<Box<dyn VaultBackend>> {
    use super::backends::{GcpSecretManagerBackend, GcpSettings};

    let backend = GcpSecretManagerBackend::new(GcpSettings {
        project_id: project_id.to_string(),
        secret_id: secret_id.to_string(),
    })
    .await?;
    Ok(Box::new(backend))
}

#[cfg(not(feature = "gcp"))]
async fn connect_gcp(_project_id: &str, _secret_id: &str) -> Result<Box<dyn VaultBackend>> {
    Err(CredsError::config(
        "GCP Secret Manager is configured but terracreds was built without the `gcp` feature",
    ))
}
