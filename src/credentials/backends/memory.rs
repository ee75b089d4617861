//! In-process vault backend.
//!
//! Holds secrets in a shared map so several handles can observe the same
//! state, the way several invocations observe one remote vault. Used by the
//! test suites and for dry runs.

use super::backend::{VaultBackend, VaultKind, WriteMethod};
use crate::credentials::name::sanitize_secret_name;
use crate::credentials::secret::SecretString;
use crate::errors::{CredsError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Shared contents of a [`MemoryVault`].
pub type MemoryVaultState = Arc<Mutex<HashMap<String, String>>>;

#[derive(Debug, Clone)]
pub struct MemoryVault {
    state: MemoryVaultState,
    secret_name: String,
    sanitize: bool,
}

impl MemoryVault {
    pub fn new(state: MemoryVaultState, secret_name: impl Into<String>) -> Self {
        Self { state, secret_name: secret_name.into(), sanitize: false }
    }

    /// Behave like a backend that rejects `.` in names.
    pub fn sanitizing(mut self) -> Self {
        self.secret_name = sanitize_secret_name(&self.secret_name);
        self.sanitize = true;
        self
    }

    fn address(&self, name: &str) -> String {
        if self.sanitize {
            sanitize_secret_name(name)
        } else {
            name.to_string()
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.state.lock().map_err(|_| {
            CredsError::backend_unavailable(VaultKind::Memory.display_name(), "state lock poisoned")
        })
    }

    fn read(&self, name: &str) -> Result<String> {
        self.lock()?.get(name).cloned().ok_or_else(|| CredsError::not_found(name))
    }
}

#[async_trait]
impl VaultBackend for MemoryVault {
    async fn create(&self, value: &SecretString) -> Result<WriteMethod> {
        let method = match self.read(&self.secret_name) {
            Ok(_) => WriteMethod::Updated,
            Err(CredsError::NotFound { .. }) => WriteMethod::Created,
            Err(e) => return Err(e),
        };

        self.lock()?.insert(self.secret_name.clone(), value.expose_secret().to_string());
        Ok(method)
    }

    async fn delete(&self) -> Result<()> {
        self.lock()?
            .remove(&self.secret_name)
            .map(|_| ())
            .ok_or_else(|| CredsError::not_found(&self.secret_name))
    }

    async fn get(&self) -> Result<Vec<u8>> {
        self.read(&self.secret_name).map(String::into_bytes)
    }

    async fn list(&self, names: &[String]) -> Result<Vec<String>> {
        names.iter().map(|name| self.read(&self.address(name))).collect()
    }

    fn kind(&self) -> VaultKind {
        VaultKind::Memory
    }

    fn secret_name(&self) -> &str {
        &self.secret_name
    }
}
