//! Adapter over the platform credential manager.
//!
//! The same lifecycle runs on every OS; only the entry layout differs:
//!
//! - **Windows**: generic credentials whose target name is the identity, the
//!   layout Terraform users see in the Credential Manager UI. The entry's
//!   user name records the owner.
//! - **macOS**: generic password items with the identity as service and the
//!   requesting user as account.
//! - **Linux**: Secret Service items (GNOME Keyring, KWallet) keyed by
//!   identity and user, persisted across reboots. The kernel keyutils
//!   session keyring caches them for the login session.

use super::native::{EntryScheme, KeyringStore, NativeStore};
use super::{local, CredentialStore, Platform, StoreTarget};
use crate::credentials::backends::WriteMethod;
use crate::credentials::response::CredentialResponse;
use crate::credentials::secret::SecretString;
use crate::errors::Result;
use async_trait::async_trait;

impl Platform {
    /// How keyring entries are laid out on this platform.
    pub fn entry_scheme(&self) -> EntryScheme {
        match self {
            Self::Windows => EntryScheme::TargetKeyed,
            Self::MacOs | Self::Linux => EntryScheme::ServiceAccount,
        }
    }
}

#[derive(Debug)]
pub struct OsCredentialStore {
    platform: Platform,
    native: Box<dyn NativeStore>,
}

impl OsCredentialStore {
    /// Adapter backed by the real credential manager of `platform`.
    pub fn new(platform: Platform) -> Self {
        Self::with_native(platform, Box::new(KeyringStore::new(platform.entry_scheme())))
    }

    pub fn with_native(platform: Platform, native: Box<dyn NativeStore>) -> Self {
        Self { platform, native }
    }
}

#[async_trait]
impl CredentialStore for OsCredentialStore {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn create(
        &self,
        identity: &str,
        value: &SecretString,
        target: StoreTarget<'_>,
    ) -> Result<WriteMethod> {
        match target {
            StoreTarget::Vault(vault) => vault.create(value).await,
            StoreTarget::Local(user) => local::create(self.native.as_ref(), identity, value, user),
        }
    }

    async fn delete(&self, identity: &str, target: StoreTarget<'_>) -> Result<()> {
        match target {
            StoreTarget::Vault(vault) => vault.delete().await,
            StoreTarget::Local(user) => local::delete(self.native.as_ref(), identity, user),
        }
    }

    async fn get(&self, identity: &str, target: StoreTarget<'_>) -> Result<Vec<u8>> {
        let response = match target {
            StoreTarget::Vault(vault) => CredentialResponse::from_payload(vault.get().await?)?,
            StoreTarget::Local(user) => {
                CredentialResponse::new(local::get(self.native.as_ref(), identity, user)?)
            }
        };
        response.encode()
    }

    async fn list(&self, identities: &[String], target: StoreTarget<'_>) -> Result<Vec<String>> {
        match target {
            StoreTarget::Vault(vault) => vault.list(identities).await,
            StoreTarget::Local(user) => local::list(self.native.as_ref(), identities, user),
        }
    }
}
