//! # Credentials
//!
//! Storage and retrieval of Terraform credentials.
//!
//! ## Architecture
//!
//! Two independent choices are made per invocation:
//!
//! ```text
//! Platform::current() ──► CredentialStore (Windows / macOS / Linux)
//!                                │
//! Config ──► resolve_backend ──► Option<VaultBackend> (AWS / Azure / GCP / HashiCorp)
//! ```
//!
//! The OS adapter is always called; when a vault backend was resolved the
//! adapter forwards to it instead of touching the local store.
//!
//! ## Naming
//!
//! [`name::resolve_secret_name`] picks the canonical name, and backends that
//! reject `.` address [`name::sanitize_secret_name`] of it.

pub mod backends;
pub mod identity;
pub mod lifecycle;
pub mod name;
pub mod resolver;
pub mod response;
pub mod secret;
pub mod store;

pub use backends::{VaultBackend, VaultKind, WriteMethod};
pub use identity::CurrentUser;
pub use lifecycle::{CreateOutcome, CredentialHelper, DeleteMode, TokenSource};
pub use name::{resolve_secret_name, sanitize_secret_name};
pub use resolver::{resolve_backend, BackendConnector, SdkConnector, VaultBackendSpec};
pub use response::CredentialResponse;
pub use secret::SecretString;
pub use store::{credential_store_for, CredentialStore, Platform, StoreTarget};
