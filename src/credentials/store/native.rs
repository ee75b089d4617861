//! Access to the operating system's credential manager.

use crate::errors::{CredsError, Result};
use keyring::Entry;
use tracing::debug;

/// Service name recorded on target-keyed entries.
pub const SERVICE_NAME: &str = "terracreds";

const STORE_NAME: &str = "OS credential store";

/// One entry read from a native store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeCredential {
    /// Account recorded on the entry
    pub owner: String,
    /// Stored payload, as written
    pub secret: String,
}

/// Minimal synchronous interface over a platform credential manager.
///
/// `target` is the credential identity (hostname or secret name), `account`
/// the requesting user. A missing entry is `NotFound`.
pub trait NativeStore: Send + Sync + std::fmt::Debug {
    fn read(&self, target: &str, account: &str) -> Result<NativeCredential>;

    fn write(&self, target: &str, account: &str, secret: &str) -> Result<()>;

    fn remove(&self, target: &str, account: &str) -> Result<()>;
}

/// How entries are addressed in the platform store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryScheme {
    /// One entry per target, carrying the account as an attribute (Windows
    /// Credential Manager generic credentials).
    TargetKeyed,
    /// One entry per (service = target, account) pair (macOS Keychain, Linux
    /// Secret Service).
    ServiceAccount,
}

/// [`NativeStore`] backed by the `keyring` crate.
#[derive(Debug, Clone, Copy)]
pub struct KeyringStore {
    scheme: EntryScheme,
}

impl KeyringStore {
    pub fn new(scheme: EntryScheme) -> Self {
        Self { scheme }
    }

    pub fn scheme(&self) -> EntryScheme {
        self.scheme
    }

    fn entry(&self, target: &str, account: &str) -> Result<Entry> {
        let entry = match self.scheme {
            EntryScheme::TargetKeyed => Entry::new_with_target(target, SERVICE_NAME, account),
            EntryScheme::ServiceAccount => Entry::new(target, account),
        };
        entry.map_err(|e| classify_keyring_error(target, e))
    }

    /// Account recorded on the entry. Only target-keyed entries can belong to
    /// someone other than the account used to open them.
    fn owner_of(&self, entry: &Entry, target: &str, account: &str) -> Result<String> {
        if self.scheme == EntryScheme::ServiceAccount {
            return Ok(account.to_string());
        }

        let attributes = entry.get_attributes().map_err(|e| classify_keyring_error(target, e))?;
        Ok(attributes.get("username").cloned().unwrap_or_else(|| account.to_string()))
    }
}

impl NativeStore for KeyringStore {
    fn read(&self, target: &str, account: &str) -> Result<NativeCredential> {
        let entry = self.entry(target, account)?;
        let secret = entry.get_password().map_err(|e| classify_keyring_error(target, e))?;
        let owner = self.owner_of(&entry, target, account)?;
        debug!(target = %target, scheme = ?self.scheme, "Read native credential");
        Ok(NativeCredential { owner, secret })
    }

    fn write(&self, target: &str, account: &str, secret: &str) -> Result<()> {
        self.entry(target, account)?
            .set_password(secret)
            .map_err(|e| classify_keyring_error(target, e))
    }

    fn remove(&self, target: &str, account: &str) -> Result<()> {
        self.entry(target, account)?
            .delete_credential()
            .map_err(|e| classify_keyring_error(target, e))
    }
}

/// Map a keyring failure onto the credential error kinds.
pub fn classify_keyring_error(target: &str, err: keyring::Error) -> CredsError {
    match err {
        keyring::Error::NoEntry => CredsError::not_found(target),
        keyring::Error::NoStorageAccess(e) => {
            CredsError::permission_denied(format!("access to '{}' was refused: {}", target, e))
        }
        keyring::Error::Invalid(attr, reason) => {
            CredsError::malformed_input(format!("invalid {} for '{}': {}", attr, target, reason))
        }
        keyring::Error::TooLong(attr, limit) => CredsError::malformed_input(format!(
            "{} for '{}' exceeds the platform limit of {}",
            attr, target, limit
        )),
        other => CredsError::backend_unavailable(STORE_NAME, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_keyring_error() {
        assert!(classify_keyring_error("h", keyring::Error::NoEntry).is_not_found());
        assert!(matches!(
            classify_keyring_error("h", keyring::Error::TooLong("password".into(), 2560)),
            CredsError::MalformedInput { .. }
        ));
        assert!(matches!(
            classify_keyring_error("h", keyring::Error::Invalid("target".into(), "empty".into())),
            CredsError::MalformedInput { .. }
        ));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_linux_entries_outlive_a_reboot() {
        use keyring::credential::{CredentialBuilderApi, CredentialPersistence};

        let builder = keyring::default::default_credential_builder();
        assert!(matches!(builder.persistence(), CredentialPersistence::UntilDelete));
    }
}
