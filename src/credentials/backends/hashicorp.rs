//! HashiCorp Vault backend
//!
//! Credentials live in a single KV v2 secret at `{mount}/data/{path}`. Each
//! credential is one key of that secret's data map, so several hostnames can
//! share one Vault secret.

use super::backend::{VaultBackend, VaultKind, WriteMethod};
use crate::credentials::secret::SecretString;
use crate::errors::{CredsError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, error, info};
use vaultrs::client::{VaultClient, VaultClientSettingsBuilder};
use vaultrs::error::ClientError;
use vaultrs::kv2;

/// Token variable used when the configuration leaves `environmentTokenName` empty.
pub const DEFAULT_TOKEN_ENV: &str = "VAULT_TOKEN";

/// Connection settings for [`HashiCorpVaultBackend`]
#[derive(Debug, Clone)]
pub struct HashiCorpSettings {
    /// Vault server address
    pub address: String,
    pub token: SecretString,
    /// KV v2 mount
    pub mount: String,
    /// Secret path within the mount
    pub path: String,
    /// Data key holding this credential
    pub key: String,
}

pub struct HashiCorpVaultBackend {
    client: VaultClient,
    mount: String,
    path: String,
    key: String,
}

impl std::fmt::Debug for HashiCorpVaultBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashiCorpVaultBackend")
            .field("mount", &self.mount)
            .field("path", &self.path)
            .field("key", &self.key)
            .field("client", &"[VaultClient]")
            .finish()
    }
}

impl HashiCorpVaultBackend {
    pub fn new(settings: HashiCorpSettings) -> Result<Self> {
        let mut settings_builder = VaultClientSettingsBuilder::default();
        settings_builder.address(&settings.address);
        settings_builder.token(settings.token.expose_secret());

        let client_settings = settings_builder.build().map_err(|e| {
            CredsError::config(format!("Invalid HashiCorp Vault configuration: {}", e))
        })?;

        let client = VaultClient::new(client_settings).map_err(|e| {
            CredsError::config(format!("Failed to create HashiCorp Vault client: {}", e))
        })?;

        debug!(address = %settings.address, mount = %settings.mount, path = %settings.path, "Initialized HashiCorp Vault backend");

        Ok(Self { client, mount: settings.mount, path: settings.path, key: settings.key })
    }

    /// Read the whole data map of the configured secret.
    async fn read_data(&self) -> Result<HashMap<String, String>> {
        kv2::read(&self.client, &self.mount, &self.path)
            .await
            .map_err(|e| classify_vault_error(&self.path, e))
    }

    async fn write_data(&self, data: &HashMap<String, String>) -> Result<()> {
        kv2::set(&self.client, &self.mount, &self.path, data)
            .await
            .map(|_| ())
            .map_err(|e| classify_vault_error(&self.path, e))
    }

    fn lookup(&self, data: &HashMap<String, String>, key: &str) -> Result<String> {
        data.get(key).cloned().ok_or_else(|| {
            CredsError::not_found(format!("{}/{}#{}", self.mount, self.path, key))
        })
    }
}

/// Map a vaultrs failure onto the credential error kinds.
pub fn classify_vault_error(path: &str, err: ClientError) -> CredsError {
    match err {
        ClientError::APIError { code: 404, .. } => CredsError::not_found(path),
        ClientError::APIError { code: 401 | 403, errors } => {
            CredsError::permission_denied(format!("Vault denied access to '{}': {}", path, errors.join("; ")))
        }
        other => {
            error!(path = %path, error = %other, "HashiCorp Vault request failed");
            CredsError::backend_unavailable(VaultKind::HashiCorpVault.display_name(), other.to_string())
        }
    }
}

#[async_trait]
impl VaultBackend for HashiCorpVaultBackend {
    async fn create(&self, value: &SecretString) -> Result<WriteMethod> {
        let mut data = match self.read_data().await {
            Ok(data) => data,
            Err(CredsError::NotFound { .. }) => HashMap::new(),
            Err(e) => return Err(e),
        };

        let method = if data.contains_key(&self.key) {
            WriteMethod::Updated
        } else {
            WriteMethod::Created
        };

        data.insert(self.key.clone(), value.expose_secret().to_string());
        self.write_data(&data).await?;

        info!(mount = %self.mount, path = %self.path, key = %self.key, method = %method, "Stored credential in HashiCorp Vault");
        Ok(method)
    }

    async fn delete(&self) -> Result<()> {
        let mut data = self.read_data().await?;
        if data.remove(&self.key).is_none() {
            return Err(CredsError::not_found(&self.key));
        }

        if data.is_empty() {
            kv2::delete_latest(&self.client, &self.mount, &self.path)
                .await
                .map_err(|e| classify_vault_error(&self.path, e))?;
        } else {
            self.write_data(&data).await?;
        }

        info!(mount = %self.mount, path = %self.path, key = %self.key, "Removed credential from HashiCorp Vault");
        Ok(())
    }

    async fn get(&self) -> Result<Vec<u8>> {
        let data = self.read_data().await?;
        self.lookup(&data, &self.key).map(String::into_bytes)
    }

    async fn list(&self, names: &[String]) -> Result<Vec<String>> {
        let data = self.read_data().await?;
        names.iter().map(|name| self.lookup(&data, name)).collect()
    }

    fn kind(&self) -> VaultKind {
        VaultKind::HashiCorpVault
    }

    fn secret_name(&self) -> &str {
        &self.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_not_found() {
        let err = classify_vault_error("terraform", ClientError::APIError { code: 404, errors: vec![] });
        assert!(err.is_not_found());
    }

    #[test]
    fn test_classify_forbidden() {
        let err = classify_vault_error(
            "terraform",
            ClientError::APIError { code: 403, errors: vec!["permission denied".into()] },
        );
        assert!(matches!(err, CredsError::PermissionDenied { .. }));
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn test_classify_server_error() {
        let err = classify_vault_error("terraform", ClientError::APIError { code: 503, errors: vec![] });
        assert!(matches!(err, CredsError::BackendUnavailable { .. }));
    }

    #[test]
    fn test_debug_hides_client() {
        let backend = HashiCorpVaultBackend::new(HashiCorpSettings {
            address: "http://127.0.0.1:8200".into(),
            token: SecretString::new("s.token"),
            mount: "kv".into(),
            path: "terraform".into(),
            key: "app.terraform.io".into(),
        })
        .unwrap();

        let debug = format!("{:?}", backend);
        assert!(debug.contains("[VaultClient]"));
        assert!(!debug.contains("s.token"));
        assert_eq!(backend.secret_name(), "app.terraform.io");
    }
}
