//! Remote secret stores
//!
//! Every backend implements [`VaultBackend`], one handle per resolved secret
//! name.
//!
//! ## Supported Backends
//!
//! - **HashiCorp Vault**: KV v2 engine
//! - **Azure Key Vault**: REST API with managed identity
//! - **AWS Secrets Manager**: (Optional feature `aws`)
//! - **GCP Secret Manager**: (Optional feature `gcp`)

#[cfg(feature = "aws")]
pub mod aws;
pub mod azure;
pub mod backend;
#[cfg(feature = "gcp")]
pub mod gcp;
pub mod hashicorp;
pub mod memory;
pub mod timeout;

pub use azure::{AzureKeyVaultBackend, AzureSettings};
pub use backend::{probe_exists, VaultBackend, VaultKind, WriteMethod};
pub use hashicorp::{HashiCorpSettings, HashiCorpVaultBackend};
pub use memory::{MemoryVault, MemoryVaultState};
pub use timeout::TimeoutBackend;

#[cfg(feature = "aws")]
pub use aws::{AwsSecretsManagerBackend, AwsSettings};
#[cfg(feature = "gcp")]
pub use gcp::{GcpSecretManagerBackend, GcpSettings};
