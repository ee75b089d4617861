//! GCP Secret Manager backend
//!
//! ## Configuration
//!
//! - `gcp.projectId` in the helper configuration - Required
//! - `gcp.secretId` - Optional fixed secret name
//! - `GOOGLE_APPLICATION_CREDENTIALS` - path to a service account key
//!
//! Secret Manager ids may not contain `.`, so every name is sanitized
//! (`app.terraform.io` is stored as `app-terraform-io`).

use super::backend::{VaultBackend, VaultKind, WriteMethod};
use crate::credentials::name::sanitize_secret_name;
use crate::credentials::secret::SecretString;
use crate::errors::{CredsError, Result};
use async_trait::async_trait;
use google_secretmanager1::api::{
    AddSecretVersionRequest, Automatic, Replication, Secret, SecretPayload,
};
use google_secretmanager1::common::Error as GcpError;
use google_secretmanager1::{hyper_rustls, hyper_util, SecretManager};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct GcpSettings {
    pub project_id: String,
    /// Resolved secret id; sanitized on construction.
    pub secret_id: String,
}

pub struct GcpSecretManagerBackend {
    hub: SecretManager<
        hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>,
    >,
    project_id: String,
    secret_id: String,
}

impl std::fmt::Debug for GcpSecretManagerBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcpSecretManagerBackend")
            .field("project_id", &self.project_id)
            .field("secret_id", &self.secret_id)
            .field("hub", &"[SecretManager]")
            .finish()
    }
}

impl GcpSecretManagerBackend {
    pub async fn new(settings: GcpSettings) -> Result<Self> {
        let client =
            hyper_util::client::legacy::Client::builder(hyper_util::rt::TokioExecutor::new())
                .build(
                    hyper_rustls::HttpsConnectorBuilder::new()
                        .with_native_roots()
                        .map_err(|e| {
                            CredsError::config(format!("Failed to load native TLS roots: {}", e))
                        })?
                        .https_or_http()
                        .enable_http2()
                        .build(),
                );

        let key_path = std::env::var("GOOGLE_APPLICATION_CREDENTIALS").unwrap_or_default();
        let key = yup_oauth2::read_service_account_key(key_path).await.map_err(|e| {
            CredsError::config(format!(
                "Failed to read GCP credentials. Set GOOGLE_APPLICATION_CREDENTIALS to a \
                service account key: {}",
                e
            ))
        })?;

        let auth = yup_oauth2::ServiceAccountAuthenticator::builder(key)
            .build()
            .await
            .map_err(|e| CredsError::config(format!("Failed to build GCP authenticator: {}", e)))?;

        let hub = SecretManager::new(client, auth);

        debug!(project_id = %settings.project_id, "Initialized GCP Secret Manager backend");

        Ok(Self {
            hub,
            project_id: settings.project_id,
            secret_id: sanitize_secret_name(&settings.secret_id),
        })
    }

    fn secret_path(&self, secret_id: &str) -> String {
        format!("projects/{}/secrets/{}", self.project_id, secret_id)
    }

    async fn access_latest(&self, secret_id: &str) -> Result<Vec<u8>> {
        let name = format!("{}/versions/latest", self.secret_path(secret_id));
        let (_, response) = self
            .hub
            .projects()
            .secrets_versions_access(&name)
            .doit()
            .await
            .map_err(|e| classify_gcp_error(secret_id, e))?;

        response.payload.and_then(|payload| payload.data).ok_or_else(|| {
            warn!(secret = %secret_id, "Secret payload has no data");
            CredsError::not_found(secret_id)
        })
    }

    async fn add_version(&self, value: &SecretString) -> Result<()> {
        let request = AddSecretVersionRequest {
            payload: Some(SecretPayload {
                data: Some(value.expose_secret().as_bytes().to_vec()),
                ..Default::default()
            }),
        };

        self.hub
            .projects()
            .secrets_add_version(request, &self.secret_path(&self.secret_id))
            .doit()
            .await
            .map_err(|e| classify_gcp_error(&self.secret_id, e))?;
        Ok(())
    }
}

/// HTTP status code and canonical status name carried by a failed call.
///
/// Error responses that decode as JSON arrive as `BadRequest` with the
/// Google error body (`{"error": {"code": 404, "status": "NOT_FOUND"}}`);
/// the rest arrive as `Failure` with only the HTTP response.
fn status_of(err: &GcpError) -> (Option<u16>, Option<String>) {
    match err {
        GcpError::BadRequest(body) => {
            let detail = &body["error"];
            let code = detail["code"].as_u64().and_then(|c| u16::try_from(c).ok());
            let status = detail["status"].as_str().map(str::to_string);
            (code, status)
        }
        GcpError::Failure(response) => (Some(response.status().as_u16()), None),
        _ => (None, None),
    }
}

/// Classify a Secret Manager failure by its HTTP status.
pub fn classify_gcp_error(secret_id: &str, err: GcpError) -> CredsError {
    if let GcpError::MissingToken(e) = &err {
        return CredsError::permission_denied(format!(
            "GCP rejected the service account credentials: {}",
            e
        ));
    }

    let (code, status) = status_of(&err);
    classify_status(secret_id, code, status.as_deref(), &err.to_string())
}

/// Map a status to an error kind. The rendered message is only searched for
/// a canonical status name when the response carried no status at all.
fn classify_status(
    secret_id: &str,
    code: Option<u16>,
    status: Option<&str>,
    rendered: &str,
) -> CredsError {
    let status = match (code, status) {
        (None, None) => ["NOT_FOUND", "PERMISSION_DENIED"]
            .into_iter()
            .find(|name| rendered.contains(name)),
        (_, status) => status,
    };

    match (code, status) {
        (Some(404), _) | (_, Some("NOT_FOUND")) => CredsError::not_found(secret_id),
        (Some(401 | 403), _) | (_, Some("PERMISSION_DENIED" | "UNAUTHENTICATED")) => {
            CredsError::permission_denied(format!(
                "GCP denied access to '{}': {}",
                secret_id, rendered
            ))
        }
        _ => {
            error!(secret = %secret_id, code = ?code, error = %rendered, "GCP Secret Manager request failed");
            CredsError::backend_unavailable(VaultKind::GcpSecretManager.display_name(), rendered)
        }
    }
}

/// True when a create failed because the secret already exists.
fn is_already_exists(err: &GcpError) -> bool {
    let (code, status) = status_of(err);
    code == Some(409) || status.as_deref() == Some("ALREADY_EXISTS")
}

fn utf8_value(secret_id: &str, payload: Vec<u8>) -> Result<String> {
    String::from_utf8(payload).map_err(|_| {
        CredsError::malformed_input(format!("secret '{}' does not hold UTF-8 text", secret_id))
    })
}

#[async_trait]
impl VaultBackend for GcpSecretManagerBackend {
    async fn create(&self, value: &SecretString) -> Result<WriteMethod> {
        let method = match self.access_latest(&self.secret_id).await {
            Ok(_) => WriteMethod::Updated,
            Err(CredsError::NotFound { .. }) => WriteMethod::Created,
            Err(e) => return Err(e),
        };

        if method == WriteMethod::Created {
            let secret = Secret {
                replication: Some(Replication {
                    automatic: Some(Automatic::default()),
                    ..Default::default()
                }),
                ..Default::default()
            };

            let parent = format!("projects/{}", self.project_id);
            let created = self
                .hub
                .projects()
                .secrets_create(secret, &parent)
                .secret_id(&self.secret_id)
                .doit()
                .await;

            // A secret without versions probes as missing but already exists.
            if let Err(e) = created {
                if !is_already_exists(&e) {
                    return Err(classify_gcp_error(&self.secret_id, e));
                }
            }
        }

        self.add_version(value).await?;

        info!(project_id = %self.project_id, secret = %self.secret_id, method = %method, "Stored credential in GCP Secret Manager");
        Ok(method)
    }

    async fn delete(&self) -> Result<()> {
        self.hub
            .projects()
            .secrets_delete(&self.secret_path(&self.secret_id))
            .doit()
            .await
            .map_err(|e| classify_gcp_error(&self.secret_id, e))?;

        info!(project_id = %self.project_id, secret = %self.secret_id, "Removed credential from GCP Secret Manager");
        Ok(())
    }

    async fn get(&self) -> Result<Vec<u8>> {
        self.access_latest(&self.secret_id).await
    }

    async fn list(&self, names: &[String]) -> Result<Vec<String>> {
        let mut values = Vec::with_capacity(names.len());
        for name in names {
            let secret_id = sanitize_secret_name(name);
            let payload = self.access_latest(&secret_id).await?;
            values.push(utf8_value(&secret_id, payload)?);
        }
        Ok(values)
    }

    fn kind(&self) -> VaultKind {
        VaultKind::GcpSecretManager
    }

    fn secret_name(&self) -> &str {
        &self.secret_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use serde_json::json;

    fn bad_request(code: u16, status: &str, message: &str) -> GcpError {
        GcpError::BadRequest(json!({
            "error": { "code": code, "status": status, "message": message }
        }))
    }

    #[test]
    fn test_classify_by_response_status() {
        let missing = bad_request(404, "NOT_FOUND", "Secret [projects/p/secrets/s] not found");
        assert!(classify_gcp_error("s", missing).is_not_found());

        let denied = bad_request(403, "PERMISSION_DENIED", "caller lacks access");
        assert_eq!(classify_gcp_error("s", denied).kind(), ErrorKind::PermissionDenied);

        let unavailable = bad_request(503, "UNAVAILABLE", "try again");
        assert_eq!(classify_gcp_error("s", unavailable).kind(), ErrorKind::BackendUnavailable);
    }

    #[test]
    fn test_status_digits_in_message_are_ignored() {
        let err = bad_request(500, "INTERNAL", "request 403-404 failed");
        assert_eq!(classify_gcp_error("s", err).kind(), ErrorKind::BackendUnavailable);

        let err = classify_status("s", Some(500), None, "upstream said 404");
        assert_eq!(err.kind(), ErrorKind::BackendUnavailable);
    }

    #[test]
    fn test_status_code_without_name() {
        assert!(classify_status("s", Some(404), None, "").is_not_found());
        assert_eq!(classify_status("s", Some(401), None, "").kind(), ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_text_fallback_only_without_status() {
        assert!(classify_status("s", None, None, "NOT_FOUND: gone").is_not_found());
        assert_eq!(
            classify_status("s", None, None, "PERMISSION_DENIED: no").kind(),
            ErrorKind::PermissionDenied
        );
        assert_eq!(
            classify_status("s", None, None, "Error 404").kind(),
            ErrorKind::BackendUnavailable
        );
        assert_eq!(classify_gcp_error("s", GcpError::Cancelled).kind(), ErrorKind::BackendUnavailable);
    }

    #[test]
    fn test_already_exists() {
        assert!(is_already_exists(&bad_request(409, "ALREADY_EXISTS", "exists")));
        assert!(!is_already_exists(&bad_request(400, "INVALID_ARGUMENT", "409 conflict")));
    }

    #[test]
    fn test_non_utf8_value_is_malformed() {
        let err = utf8_value("s", vec![0xff, 0xfe]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
        assert_eq!(utf8_value("s", b"tok".to_vec()).unwrap(), "tok");
    }
}
