//! Common test utilities for all integration tests.
//!
//! Wires a [`CredentialHelper`] to in-process fakes: a [`MemoryNativeStore`]
//! behind the Linux-layout OS adapter, and a [`MemoryVault`] handed out by
//! [`StaticConnector`] whenever the configuration selects a vault.

#![allow(dead_code)]
#![allow(clippy::duplicate_mod)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use terracreds::config::Config;
use terracreds::credentials::backends::{MemoryVault, MemoryVaultState, VaultBackend};
use terracreds::credentials::store::{MemoryNativeStore, OsCredentialStore};
use terracreds::credentials::{
    BackendConnector, CredentialHelper, CurrentUser, Platform, VaultBackendSpec,
};
use terracreds::Result;

/// Hands out [`MemoryVault`] handles over one shared state.
#[derive(Debug, Clone, Default)]
pub struct StaticConnector {
    pub state: MemoryVaultState,
    connected: Arc<Mutex<Vec<VaultBackendSpec>>>,
}

impl StaticConnector {
    /// Specs passed to `connect`, in call order.
    pub fn connections(&self) -> Vec<VaultBackendSpec> {
        self.connected.lock().unwrap().clone()
    }

    pub fn stored(&self, name: &str) -> Option<String> {
        self.state.lock().unwrap().get(name).cloned()
    }
}

#[async_trait]
impl BackendConnector for StaticConnector {
    async fn connect(&self, spec: &VaultBackendSpec) -> Result<Box<dyn VaultBackend>> {
        self.connected.lock().unwrap().push(spec.clone());

        let vault = MemoryVault::new(self.state.clone(), spec.secret_name());
        if spec.kind().sanitizes_names() {
            Ok(Box::new(vault.sanitizing()))
        } else {
            Ok(Box::new(vault))
        }
    }
}

/// A configuration, a fake OS store and a fake vault.
pub struct Harness {
    pub config: Config,
    pub native: MemoryNativeStore,
    pub store: OsCredentialStore,
    pub connector: StaticConnector,
}

impl Harness {
    pub fn new(config: Config) -> Self {
        let native = MemoryNativeStore::new();
        let store = OsCredentialStore::with_native(Platform::Linux, Box::new(native.clone()));
        Self { config, native, store, connector: StaticConnector::default() }
    }

    /// No vault configured; credentials go to the OS store.
    pub fn local() -> Self {
        Self::new(Config::default())
    }

    /// Helper acting for `username`.
    pub fn helper(&self, username: &str) -> CredentialHelper<'_> {
        self.process_helper().with_user(CurrentUser::new(username))
    }

    /// Helper that looks up the account owning the test process.
    pub fn process_helper(&self) -> CredentialHelper<'_> {
        CredentialHelper::new(&self.config, &self.store, &self.connector)
    }
}

pub fn aws_config(secret_name: &str) -> Config {
    let mut config = Config::default();
    config.aws.region = "us-east-1".to_string();
    config.aws.secret_name = secret_name.to_string();
    config
}

pub fn azure_config() -> Config {
    let mut config = Config::default();
    config.azure.vault_uri = "https://kv-terracreds.vault.azure.net/".to_string();
    config
}
