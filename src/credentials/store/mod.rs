//! OS credential store adapter.
//!
//! [`OsCredentialStore`] implements [`CredentialStore`] over the platform
//! credential manager. The process picks the platform at startup with
//! [`credential_store_for`].
//!
//! # Delegation
//!
//! Every operation takes a [`StoreTarget`]. A vault target forwards the call
//! to the backend and skips all local logic, including the ownership check;
//! the vault enforces its own access control. Only a local target carries the
//! requesting user, so the OS account is looked up only when the local store
//! is used.
//!
//! # Example
//!
//! ```rust,ignore
//! use terracreds::credentials::store::{credential_store_for, Platform, StoreTarget};
//!
//! let store = credential_store_for(Platform::current());
//! let envelope = store.get("app.terraform.io", StoreTarget::Local(&user)).await?;
//! ```

pub(crate) mod local;
pub mod memory;
pub mod native;
pub mod os;

pub use memory::MemoryNativeStore;
pub use native::{EntryScheme, KeyringStore, NativeCredential, NativeStore};
pub use os::OsCredentialStore;

use crate::credentials::backends::{VaultBackend, WriteMethod};
use crate::credentials::identity::CurrentUser;
use crate::credentials::secret::SecretString;
use crate::errors::Result;
use async_trait::async_trait;
use std::fmt;

/// Operating system families with a native credential manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    /// The platform this binary runs on. Other Unix flavours use the Linux adapter.
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => Self::Windows,
            "macos" => Self::MacOs,
            _ => Self::Linux,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::MacOs => "macos",
            Self::Linux => "linux",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where an operation is carried out.
#[derive(Debug, Clone, Copy)]
pub enum StoreTarget<'a> {
    /// The OS credential manager, on behalf of this user
    Local(&'a CurrentUser),
    /// A configured vault backend
    Vault(&'a dyn VaultBackend),
}

/// Credential lifecycle over one OS credential manager.
///
/// `identity` is the resolved secret name.
#[async_trait]
pub trait CredentialStore: Send + Sync + fmt::Debug {
    fn platform(&self) -> Platform;

    /// Create or update. Probes for an existing entry before writing.
    async fn create(
        &self,
        identity: &str,
        value: &SecretString,
        target: StoreTarget<'_>,
    ) -> Result<WriteMethod>;

    async fn delete(&self, identity: &str, target: StoreTarget<'_>) -> Result<()>;

    /// The credential as `{"token": ...}` JSON.
    async fn get(&self, identity: &str, target: StoreTarget<'_>) -> Result<Vec<u8>>;

    /// Values of `identities` in input order. The first failure aborts.
    async fn list(&self, identities: &[String], target: StoreTarget<'_>) -> Result<Vec<String>>;
}

/// Build the adapter for `platform`, backed by the real credential manager.
pub fn credential_store_for(platform: Platform) -> Box<dyn CredentialStore> {
    Box::new(OsCredentialStore::new(platform))
}
