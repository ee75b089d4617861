//! Credential lifecycle orchestration.
//!
//! [`CredentialHelper`] runs one operation per invocation:
//!
//! ```text
//! supplied name → canonical name → vault backend (optional) → OS adapter
//! ```
//!
//! The OS adapter forwards to the vault backend when one was resolved.

use super::backends::{TimeoutBackend, VaultBackend, WriteMethod};
use super::identity::CurrentUser;
use super::name::resolve_secret_name;
use super::resolver::{resolve_backend, BackendConnector};
use super::response::CredentialResponse;
use super::secret::SecretString;
use super::store::{CredentialStore, StoreTarget};
use crate::config::Config;
use crate::credential_span;
use crate::errors::Result;
use std::io::Read;
use std::sync::OnceLock;
use tracing::{debug, error, info, Instrument};

/// Where the value for a create comes from.
#[derive(Debug, Clone)]
pub enum TokenSource {
    /// Supplied on the command line
    Inline(SecretString),
    /// One `{"token": ...}` object on stdin
    FromStdin,
}

impl TokenSource {
    pub fn resolve<R: Read + ?Sized>(self, stdin: &mut R) -> Result<SecretString> {
        match self {
            Self::Inline(value) => Ok(value),
            Self::FromStdin => {
                let envelope = CredentialResponse::read_from(stdin)?;
                Ok(SecretString::new(envelope.token))
            }
        }
    }
}

/// How a delete was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// `delete` command: the caller reports the outcome to the user
    Explicit,
    /// `forget` (Terraform logout): silent on success, failures are logged
    Forget,
}

/// Result of a create-or-update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOutcome {
    /// Name the credential was stored under
    pub name: String,
    pub method: WriteMethod,
}

/// Runs credential operations for one invocation.
///
/// The requesting OS account is resolved on first use of the local store.
/// Operations that go to a vault never look it up.
pub struct CredentialHelper<'a> {
    config: &'a Config,
    store: &'a dyn CredentialStore,
    connector: &'a dyn BackendConnector,
    user: OnceLock<CurrentUser>,
}

impl<'a> CredentialHelper<'a> {
    pub fn new(
        config: &'a Config,
        store: &'a dyn CredentialStore,
        connector: &'a dyn BackendConnector,
    ) -> Self {
        Self { config, store, connector, user: OnceLock::new() }
    }

    /// Act for `user` instead of the account owning this process.
    pub fn with_user(self, user: CurrentUser) -> Self {
        let _ = self.user.set(user);
        self
    }

    /// The requesting user, if it has been resolved yet.
    pub fn resolved_user(&self) -> Option<&CurrentUser> {
        self.user.get()
    }

    /// The requesting user, looked up from the OS on first call.
    pub fn user(&self) -> Result<&CurrentUser> {
        if let Some(user) = self.user.get() {
            return Ok(user);
        }
        let user = CurrentUser::from_os()?;
        Ok(self.user.get_or_init(|| user))
    }

    /// Canonical secret name for a caller-supplied name.
    pub fn secret_name(&self, supplied: &str) -> String {
        resolve_secret_name(self.config, supplied)
    }

    async fn vault_for(&self, name: &str) -> Result<Option<Box<dyn VaultBackend>>> {
        let Some(spec) = resolve_backend(self.config, name) else {
            debug!(platform = %self.store.platform(), "Using OS credential store");
            return Ok(None);
        };

        let backend = self.connector.connect(&spec).await?;
        Ok(Some(Box::new(TimeoutBackend::new(backend, self.config.vault_timeout()))))
    }

    fn target<'s>(&'s self, vault: Option<&'s dyn VaultBackend>) -> Result<StoreTarget<'s>> {
        match vault {
            Some(vault) => Ok(StoreTarget::Vault(vault)),
            None => Ok(StoreTarget::Local(self.user()?)),
        }
    }

    /// Create or update the credential for `supplied`.
    ///
    /// The value is read from `source` before any backend is contacted.
    pub async fn create<R: Read + ?Sized>(
        &self,
        supplied: &str,
        source: TokenSource,
        stdin: &mut R,
    ) -> Result<CreateOutcome> {
        let name = self.secret_name(supplied);
        let value = source.resolve(stdin)?;

        async {
            let vault = self.vault_for(&name).await?;
            let method = self.store.create(&name, &value, self.target(vault.as_deref())?).await?;
            info!(method = %method, "SUCCESS: {} the credential object '{}'", method, name);
            Ok(CreateOutcome { name: name.clone(), method })
        }
        .instrument(credential_span!("create", name))
        .await
    }

    /// The credential for `supplied` as `{"token": ...}` JSON.
    pub async fn get(&self, supplied: &str) -> Result<Vec<u8>> {
        let name = self.secret_name(supplied);

        async {
            let vault = self.vault_for(&name).await?;
            let target = self.target(vault.as_deref())?;
            let envelope = self.store.get(&name, target).await?;
            match target {
                StoreTarget::Local(user) => {
                    info!(user = %user.username, "Token was retrieved for '{}'", name)
                }
                StoreTarget::Vault(vault) => {
                    info!(vault = %vault.kind(), "Token was retrieved for '{}'", name)
                }
            }
            Ok(envelope)
        }
        .instrument(credential_span!("get", name))
        .await
    }

    /// Delete the credential for `supplied`, returning the name removed.
    pub async fn delete(&self, supplied: &str, mode: DeleteMode) -> Result<String> {
        let name = self.secret_name(supplied);

        let outcome = async {
            let vault = self.vault_for(&name).await?;
            self.store.delete(&name, self.target(vault.as_deref())?).await
        }
        .instrument(credential_span!("delete", name))
        .await;

        match (&outcome, mode) {
            (Ok(()), DeleteMode::Explicit) => {
                info!("The credential object '{}' has been removed", name)
            }
            (Ok(()), DeleteMode::Forget) => debug!(secret = %name, "Credential forgotten"),
            (Err(e), _) => error!(secret = %name, mode = ?mode, error = %e, "Failed to remove credential"),
        }

        outcome.map(|()| name)
    }

    /// Values for `names`, in the same order. Names are used as given.
    pub async fn list(&self, names: &[String]) -> Result<Vec<String>> {
        let first = names.first().map(String::as_str).unwrap_or_default();

        async {
            let vault = self.vault_for(first).await?;
            self.store.list(names, self.target(vault.as_deref())?).await
        }
        .instrument(credential_span!("list", format!("{} names", names.len())))
        .await
    }
}
