//! In-process [`NativeStore`].
//!
//! Entries are keyed by target only and remember the account that wrote
//! them, like target-keyed Windows credentials. This lets tests exercise the
//! ownership checks without touching the real credential manager.

use super::native::{NativeCredential, NativeStore};
use crate::errors::{CredsError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Default)]
pub struct MemoryNativeStore {
    entries: Arc<Mutex<HashMap<String, NativeCredential>>>,
}

impl MemoryNativeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry owned by `owner`.
    pub fn insert(&self, target: &str, owner: &str, secret: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                target.to_string(),
                NativeCredential { owner: owner.to_string(), secret: secret.to_string() },
            );
        }
    }

    /// Raw stored payload for `target`.
    pub fn raw(&self, target: &str) -> Option<String> {
        self.entries.lock().ok()?.get(target).map(|c| c.secret.clone())
    }

    /// Account recorded as the writer of `target`.
    pub fn owner(&self, target: &str) -> Option<String> {
        self.entries.lock().ok()?.get(target).map(|c| c.owner.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, NativeCredential>>> {
        self.entries
            .lock()
            .map_err(|_| CredsError::backend_unavailable("Memory store", "state lock poisoned"))
    }
}

impl NativeStore for MemoryNativeStore {
    fn read(&self, target: &str, _account: &str) -> Result<NativeCredential> {
        self.lock()?.get(target).cloned().ok_or_else(|| CredsError::not_found(target))
    }

    fn write(&self, target: &str, account: &str, secret: &str) -> Result<()> {
        self.lock()?.insert(
            target.to_string(),
            NativeCredential { owner: account.to_string(), secret: secret.to_string() },
        );
        Ok(())
    }

    fn remove(&self, target: &str, _account: &str) -> Result<()> {
        self.lock()?.remove(target).map(|_| ()).ok_or_else(|| CredsError::not_found(target))
    }
}
