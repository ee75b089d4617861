//! Deadline wrapper for vault backends.
//!
//! Wraps any [`VaultBackend`] and bounds each call. An expired call surfaces
//! as `BackendUnavailable`; nothing is retried.

use super::backend::{VaultBackend, VaultKind, WriteMethod};
use crate::credentials::secret::SecretString;
use crate::errors::{CredsError, Result};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Debug)]
pub struct TimeoutBackend {
    inner: Box<dyn VaultBackend>,
    timeout: Duration,
}

impl TimeoutBackend {
    pub fn new(inner: Box<dyn VaultBackend>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T>(&self, operation: &str, call: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    backend = %self.inner.kind(),
                    operation = %operation,
                    timeout_secs = self.timeout.as_secs(),
                    "Vault call timed out"
                );
                Err(CredsError::backend_unavailable(
                    self.inner.kind().display_name(),
                    format!("{} timed out after {}s", operation, self.timeout.as_secs()),
                ))
            }
        }
    }
}

#[async_trait]
impl VaultBackend for TimeoutBackend {
    async fn create(&self, value: &SecretString) -> Result<WriteMethod> {
        self.bounded("create", self.inner.create(value)).await
    }

    async fn delete(&self) -> Result<()> {
        self.bounded("delete", self.inner.delete()).await
    }

    async fn get(&self) -> Result<Vec<u8>> {
        self.bounded("get", self.inner.get()).await
    }

    async fn list(&self, names: &[String]) -> Result<Vec<String>> {
        self.bounded("list", self.inner.list(names)).await
    }

    fn kind(&self) -> VaultKind {
        self.inner.kind()
    }

    fn secret_name(&self) -> &str {
        self.inner.secret_name()
    }
}
