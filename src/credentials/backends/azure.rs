//! Azure Key Vault backend
//!
//! Talks to the Key Vault REST API directly. Access tokens come from the
//! managed identity endpoint of the host (Azure Instance Metadata Service),
//! so the helper needs no stored Azure credentials.
//!
//! Key Vault secret names may only contain alphanumerics and dashes; every
//! name this backend addresses has `.` replaced by `-`.

use super::backend::{VaultBackend, VaultKind, WriteMethod};
use crate::credentials::name::sanitize_secret_name;
use crate::credentials::secret::SecretString;
use crate::errors::{CredsError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

/// OAuth resource identifier for Key Vault data plane access.
pub const KEY_VAULT_RESOURCE: &str = "https://vault.azure.net";

pub const KEY_VAULT_API_VERSION: &str = "7.4";

/// Managed identity token endpoint of the Instance Metadata Service.
pub const IMDS_TOKEN_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";

const IMDS_API_VERSION: &str = "2018-02-01";

/// Content type recorded on every secret written by the helper.
const SECRET_CONTENT_TYPE: &str = "password";

#[derive(Debug, Clone)]
pub struct AzureSettings {
    /// e.g. `https://my-vault.vault.azure.net/`
    pub vault_uri: String,
    /// Resolved secret name; sanitized on construction.
    pub secret_name: String,
    pub identity_endpoint: String,
}

impl AzureSettings {
    pub fn new(vault_uri: impl Into<String>, secret_name: impl Into<String>) -> Self {
        Self {
            vault_uri: vault_uri.into(),
            secret_name: secret_name.into(),
            identity_endpoint: IMDS_TOKEN_ENDPOINT.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct SecretBundle {
    value: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SecretSetParameters<'a> {
    value: &'a str,
    content_type: &'a str,
}

pub struct AzureKeyVaultBackend {
    http: Client,
    vault_uri: String,
    secret_name: String,
    identity_endpoint: String,
    token: OnceCell<SecretString>,
}

impl std::fmt::Debug for AzureKeyVaultBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureKeyVaultBackend")
            .field("vault_uri", &self.vault_uri)
            .field("secret_name", &self.secret_name)
            .field("http", &"[reqwest::Client]")
            .finish()
    }
}

impl AzureKeyVaultBackend {
    pub fn new(settings: AzureSettings) -> Result<Self> {
        if settings.vault_uri.trim().is_empty() {
            return Err(CredsError::config("Azure Key Vault requires a vaultUri"));
        }

        let http = Client::builder().build().map_err(|e| {
            CredsError::config(format!("Failed to create Azure Key Vault HTTP client: {}", e))
        })?;

        debug!(vault_uri = %settings.vault_uri, "Initialized Azure Key Vault backend");

        Ok(Self {
            http,
            vault_uri: settings.vault_uri.trim_end_matches('/').to_string(),
            secret_name: sanitize_secret_name(&settings.secret_name),
            identity_endpoint: settings.identity_endpoint,
            token: OnceCell::new(),
        })
    }

    fn unavailable(message: impl Into<String>) -> CredsError {
        CredsError::backend_unavailable(VaultKind::AzureKeyVault.display_name(), message)
    }

    /// Managed identity access token, fetched once per handle.
    async fn access_token(&self) -> Result<&SecretString> {
        self.token
            .get_or_try_init(|| async {
                let response = self
                    .http
                    .get(&self.identity_endpoint)
                    .query(&[("api-version", IMDS_API_VERSION), ("resource", KEY_VAULT_RESOURCE)])
                    .header("Metadata", "true")
                    .send()
                    .await
                    .map_err(|e| Self::unavailable(format!("managed identity endpoint: {}", e)))?;

                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(match status {
                        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                            CredsError::permission_denied(format!(
                                "managed identity token request rejected ({}): {}",
                                status, body
                            ))
                        }
                        _ => Self::unavailable(format!("managed identity endpoint returned {}", status)),
                    });
                }

                let token: TokenResponse = response
                    .json()
                    .await
                    .map_err(|e| Self::unavailable(format!("invalid token response: {}", e)))?;
                Ok(SecretString::new(token.access_token))
            })
            .await
    }

    fn secret_url(&self, name: &str) -> String {
        format!("{}/secrets/{}", self.vault_uri, name)
    }

    /// Turn a non-success response into the matching error kind.
    async fn status_error(name: &str, response: Response) -> CredsError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND => CredsError::not_found(name),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CredsError::permission_denied(
                format!("Key Vault denied access to '{}': {}", name, body),
            ),
            _ => {
                error!(secret = %name, status = %status, "Azure Key Vault request failed");
                Self::unavailable(format!("'{}' returned {}: {}", name, status, body))
            }
        }
    }

    async fn get_secret(&self, name: &str) -> Result<String> {
        let token = self.access_token().await?;
        let response = self
            .http
            .get(self.secret_url(name))
            .query(&[("api-version", KEY_VAULT_API_VERSION)])
            .bearer_auth(token.expose_secret())
            .send()
            .await
            .map_err(|e| Self::unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::status_error(name, response).await);
        }

        let bundle: SecretBundle = response
            .json()
            .await
            .map_err(|e| Self::unavailable(format!("invalid secret bundle for '{}': {}", name, e)))?;
        Ok(bundle.value)
    }

    async fn set_secret(&self, name: &str, value: &SecretString) -> Result<()> {
        let token = self.access_token().await?;
        let response = self
            .http
            .put(self.secret_url(name))
            .query(&[("api-version", KEY_VAULT_API_VERSION)])
            .bearer_auth(token.expose_secret())
            .json(&SecretSetParameters {
                value: value.expose_secret(),
                content_type: SECRET_CONTENT_TYPE,
            })
            .send()
            .await
            .map_err(|e| Self::unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::status_error(name, response).await);
        }
        Ok(())
    }
}

#[async_trait]
impl VaultBackend for AzureKeyVaultBackend {
    async fn create(&self, value: &SecretString) -> Result<WriteMethod> {
        // Key Vault has a single upsert call; the probe only decides the reported method.
        let method = match self.get_secret(&self.secret_name).await {
            Ok(_) => WriteMethod::Updated,
            Err(CredsError::NotFound { .. }) => WriteMethod::Created,
            Err(e) => return Err(e),
        };

        self.set_secret(&self.secret_name, value).await?;

        info!(vault_uri = %self.vault_uri, secret = %self.secret_name, method = %method, "Stored credential in Azure Key Vault");
        Ok(method)
    }

    async fn delete(&self) -> Result<()> {
        let token = self.access_token().await?;
        let response = self
            .http
            .delete(self.secret_url(&self.secret_name))
            .query(&[("api-version", KEY_VAULT_API_VERSION)])
            .bearer_auth(token.expose_secret())
            .send()
            .await
            .map_err(|e| Self::unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::status_error(&self.secret_name, response).await);
        }

        info!(vault_uri = %self.vault_uri, secret = %self.secret_name, "Removed credential from Azure Key Vault");
        Ok(())
    }

    async fn get(&self) -> Result<Vec<u8>> {
        self.get_secret(&self.secret_name).await.map(String::into_bytes)
    }

    async fn list(&self, names: &[String]) -> Result<Vec<String>> {
        let mut values = Vec::with_capacity(names.len());
        for name in names {
            values.push(self.get_secret(&sanitize_secret_name(name)).await?);
        }
        Ok(values)
    }

    fn kind(&self) -> VaultKind {
        VaultKind::AzureKeyVault
    }

    fn secret_name(&self) -> &str {
        &self.secret_name
    }
}
