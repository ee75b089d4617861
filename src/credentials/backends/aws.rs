//! AWS Secrets Manager backend
//!
//! Credentials are resolved through the standard AWS provider chain
//! (environment, shared profile, instance role). Only the region comes from
//! the helper configuration.

use super::backend::{VaultBackend, VaultKind, WriteMethod};
use crate::credentials::secret::SecretString;
use crate::errors::{CredsError, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_secretsmanager::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_secretsmanager::Client;
use tracing::{debug, error, info};

/// Days a deleted secret stays recoverable.
pub const RECOVERY_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone)]
pub struct AwsSettings {
    pub region: String,
    /// Description attached to secrets created by the helper
    pub description: String,
    pub secret_name: String,
}

pub struct AwsSecretsManagerBackend {
    client: Client,
    secret_name: String,
    description: String,
}

impl std::fmt::Debug for AwsSecretsManagerBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsSecretsManagerBackend")
            .field("secret_name", &self.secret_name)
            .field("client", &"[SecretsManagerClient]")
            .finish()
    }
}

impl AwsSecretsManagerBackend {
    pub async fn new(settings: AwsSettings) -> Result<Self> {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .load()
            .await;

        debug!(region = %settings.region, "Initialized AWS Secrets Manager backend");

        Ok(Self {
            client: Client::new(&sdk_config),
            secret_name: settings.secret_name,
            description: settings.description,
        })
    }

    async fn read_secret(&self, name: &str) -> Result<String> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(name)
            .send()
            .await
            .map_err(|e| classify_sdk_error(name, e))?;

        output
            .secret_string()
            .map(str::to_string)
            .ok_or_else(|| CredsError::not_found(name))
    }
}

/// Map an SDK failure onto the credential error kinds using the service
/// error code.
pub fn classify_sdk_error<E, R>(name: &str, err: SdkError<E, R>) -> CredsError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    let code = err.code().map(str::to_string);
    let message = err.message().map(str::to_string).unwrap_or_else(|| format!("{:?}", err));
    classify_error_code(name, code.as_deref(), &message)
}

fn classify_error_code(name: &str, code: Option<&str>, message: &str) -> CredsError {
    match code {
        Some("ResourceNotFoundException") => CredsError::not_found(name),
        Some("AccessDeniedException" | "UnrecognizedClientException" | "InvalidSignatureException") => {
            CredsError::permission_denied(format!("AWS denied access to '{}': {}", name, message))
        }
        _ => {
            error!(secret = %name, code = ?code, error = %message, "AWS Secrets Manager request failed");
            CredsError::backend_unavailable(VaultKind::AwsSecretsManager.display_name(), message)
        }
    }
}

#[async_trait]
impl VaultBackend for AwsSecretsManagerBackend {
    async fn create(&self, value: &SecretString) -> Result<WriteMethod> {
        let method = match self.read_secret(&self.secret_name).await {
            Ok(_) => WriteMethod::Updated,
            Err(CredsError::NotFound { .. }) => WriteMethod::Created,
            Err(e) => return Err(e),
        };

        match method {
            WriteMethod::Created => {
                let mut request = self
                    .client
                    .create_secret()
                    .name(&self.secret_name)
                    .secret_string(value.expose_secret());
                if !self.description.is_empty() {
                    request = request.description(&self.description);
                }
                request.send().await.map_err(|e| classify_sdk_error(&self.secret_name, e))?;
            }
            WriteMethod::Updated => {
                self.client
                    .put_secret_value()
                    .secret_id(&self.secret_name)
                    .secret_string(value.expose_secret())
                    .send()
                    .await
                    .map_err(|e| classify_sdk_error(&self.secret_name, e))?;
            }
        }

        info!(secret = %self.secret_name, method = %method, "Stored credential in AWS Secrets Manager");
        Ok(method)
    }

    async fn delete(&self) -> Result<()> {
        self.client
            .delete_secret()
            .secret_id(&self.secret_name)
            .recovery_window_in_days(RECOVERY_WINDOW_DAYS)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&self.secret_name, e))?;

        info!(secret = %self.secret_name, recovery_window_days = RECOVERY_WINDOW_DAYS, "Scheduled credential deletion in AWS Secrets Manager");
        Ok(())
    }

    async fn get(&self) -> Result<Vec<u8>> {
        self.read_secret(&self.secret_name).await.map(String::into_bytes)
    }

    async fn list(&self, names: &[String]) -> Result<Vec<String>> {
        let mut values = Vec::with_capacity(names.len());
        for name in names {
            values.push(self.read_secret(name).await?);
        }
        Ok(values)
    }

    fn kind(&self) -> VaultKind {
        VaultKind::AwsSecretsManager
    }

    fn secret_name(&self) -> &str {
        &self.secret_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_error_code() {
        assert!(classify_error_code("s", Some("ResourceNotFoundException"), "gone").is_not_found());
        assert!(matches!(
            classify_error_code("s", Some("AccessDeniedException"), "no"),
            CredsError::PermissionDenied { .. }
        ));
        assert!(matches!(
            classify_error_code("s", None, "dispatch failure"),
            CredsError::BackendUnavailable { .. }
        ));
    }
}
