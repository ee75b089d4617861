//! # terracreds
//!
//! A Terraform credentials helper. Terraform invokes it through the
//! `credentials_helper` protocol to store, fetch and forget API tokens; the
//! tokens live either in the operating system's credential manager or in a
//! cloud secret vault chosen by configuration.
//!
//! ## Architecture
//!
//! ```text
//! CLI (clap) → CredentialHelper → CredentialStore (per OS) → VaultBackend (optional)
//!     ↓                ↓
//! Config (YAML)   Logging (tracing)
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use terracreds::config::Config;
//! use terracreds::credentials::{
//!     credential_store_for, CredentialHelper, Platform, SdkConnector,
//! };
//!
//! # async fn run() -> terracreds::Result<()> {
//! let config = Config::default();
//! let store = credential_store_for(Platform::current());
//! let helper = CredentialHelper::new(&config, store.as_ref(), &SdkConnector);
//!
//! let envelope = helper.get("app.terraform.io").await?;
//! println!("{}", String::from_utf8_lossy(&envelope));
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod observability;

pub use config::Config;
pub use errors::{CredsError, ErrorKind, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
