//! Credential lifecycle against a native store.
//!
//! Shared by the per-OS adapters. Values are persisted inside the
//! `{"token": ...}` envelope and every access checks that the entry belongs to
//! the requesting user.

use super::native::{NativeCredential, NativeStore};
use crate::credentials::backends::{probe_exists, WriteMethod};
use crate::credentials::identity::CurrentUser;
use crate::credentials::response::CredentialResponse;
use crate::credentials::secret::SecretString;
use crate::errors::{CredsError, Result};
use tracing::{debug, info, warn};

fn check_owner(identity: &str, cred: &NativeCredential, user: &CurrentUser) -> Result<()> {
    if user.owns(&cred.owner) {
        return Ok(());
    }

    warn!(
        server = %identity,
        user = %user.username,
        "Credential belongs to a different user"
    );
    Err(CredsError::permission_denied(format!(
        "'{}' is not owned by '{}'",
        identity, user.username
    )))
}

pub(crate) fn create(
    native: &dyn NativeStore,
    identity: &str,
    value: &SecretString,
    user: &CurrentUser,
) -> Result<WriteMethod> {
    let probe = native.read(identity, &user.username);
    if let Ok(existing) = &probe {
        check_owner(identity, existing, user)?;
    }

    let method = if probe_exists(probe)? { WriteMethod::Updated } else { WriteMethod::Created };

    let payload = String::from_utf8(CredentialResponse::new(value.expose_secret()).encode()?)
        .map_err(|e| CredsError::malformed_input(e.to_string()))?;
    native.write(identity, &user.username, &payload)?;

    info!(server = %identity, user = %user.username, method = %method, "Stored credential in OS store");
    Ok(method)
}

pub(crate) fn delete(native: &dyn NativeStore, identity: &str, user: &CurrentUser) -> Result<()> {
    let existing = native.read(identity, &user.username)?;
    check_owner(identity, &existing, user)?;

    native.remove(identity, &user.username)?;
    info!(server = %identity, user = %user.username, "Removed credential from OS store");
    Ok(())
}

/// Unwrapped value of the credential.
pub(crate) fn get(native: &dyn NativeStore, identity: &str, user: &CurrentUser) -> Result<String> {
    info!(server = %identity, user = %user.username, "Credential requested");

    let existing = native.read(identity, &user.username)?;
    check_owner(identity, &existing, user)?;

    debug!(server = %identity, "Token was retrieved");
    Ok(CredentialResponse::unwrap_stored(&existing.secret))
}

pub(crate) fn list(
    native: &dyn NativeStore,
    identities: &[String],
    user: &CurrentUser,
) -> Result<Vec<String>> {
    identities.iter().map(|identity| get(native, identity, user)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::store::memory::MemoryNativeStore;

    fn alice() -> CurrentUser {
        CurrentUser::new("alice")
    }

    #[test]
    fn test_create_wraps_value_in_envelope() {
        let store = MemoryNativeStore::new();
        let method = create(&store, "host", &SecretString::new("tok"), &alice()).unwrap();

        assert_eq!(method, WriteMethod::Created);
        assert_eq!(store.raw("host").unwrap(), r#"{"token":"tok"}"#);
        assert_eq!(get(&store, "host", &alice()).unwrap(), "tok");
    }

    #[test]
    fn test_create_refuses_foreign_entry() {
        let store = MemoryNativeStore::new();
        store.insert("host", "bob", r#"{"token":"bob-token"}"#);

        let err = create(&store, "host", &SecretString::new("mine"), &alice()).unwrap_err();
        assert!(matches!(err, CredsError::PermissionDenied { .. }));
        assert_eq!(store.raw("host").unwrap(), r#"{"token":"bob-token"}"#);
    }

    #[test]
    fn test_legacy_raw_entry_is_readable() {
        let store = MemoryNativeStore::new();
        store.insert("host", "alice", "plain-old-token");

        assert_eq!(get(&store, "host", &alice()).unwrap(), "plain-old-token");
    }

    #[test]
    fn test_delete_checks_owner_first() {
        let store = MemoryNativeStore::new();
        store.insert("host", "bob", "x");

        let err = delete(&store, "host", &alice()).unwrap_err();
        assert!(matches!(err, CredsError::PermissionDenied { .. }));
        assert!(store.raw("host").is_some());
    }

    #[test]
    fn test_list_aborts_on_first_failure() {
        let store = MemoryNativeStore::new();
        store.insert("a", "alice", "1");
        store.insert("c", "alice", "3");

        let names = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert!(list(&store, &names, &alice()).unwrap_err().is_not_found());

        let names = vec!["c".to_string(), "a".to_string()];
        assert_eq!(list(&store, &names, &alice()).unwrap(), vec!["3", "1"]);
    }
}
