//! Error types for credential operations.
//!
//! Every operation in the library returns [`Result`]. Errors propagate unchanged
//! to the CLI, which maps them onto user-facing messages and an exit status.
//! Nothing in the library retries.

use thiserror::Error;

/// Result type for credential operations.
pub type Result<T> = std::result::Result<T, CredsError>;

/// Coarse classification of a [`CredsError`].
///
/// Callers branch on the kind rather than on individual variants; in particular
/// the existence probe before a write treats only [`ErrorKind::NotFound`] as
/// "absent".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    PermissionDenied,
    BackendUnavailable,
    MalformedInput,
    Config,
    Internal,
}

/// Errors that can occur while storing or retrieving a credential.
#[derive(Error, Debug)]
pub enum CredsError {
    /// The credential does not exist in the addressed store.
    #[error("Credential not found: {name}")]
    NotFound { name: String },

    /// The store refused the operation, or the credential belongs to another user.
    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    /// The backend could not be reached or returned an unexpected failure.
    #[error("{backend} unavailable: {message}")]
    BackendUnavailable { backend: String, message: String },

    /// Input from the caller could not be decoded.
    #[error("Malformed input: {message}")]
    MalformedInput { message: String },

    /// Configuration is invalid or requests an unsupported backend.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CredsError {
    /// Create a not found error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Create a permission denied error.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied { message: message.into() }
    }

    /// Create a backend unavailable error.
    pub fn backend_unavailable(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BackendUnavailable { backend: backend.into(), message: message.into() }
    }

    /// Create a malformed input error.
    pub fn malformed_input(message: impl Into<String>) -> Self {
        Self::MalformedInput { message: message.into() }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::BackendUnavailable { .. } => ErrorKind::BackendUnavailable,
            Self::MalformedInput { .. } => ErrorKind::MalformedInput,
            Self::Config { .. } => ErrorKind::Config,
            Self::Serialization(_) | Self::Io(_) => ErrorKind::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// True for the two kinds that are reported to the user as a permission
    /// problem, so that callers cannot tell a missing credential from a
    /// foreign one.
    pub fn is_access_denied(&self) -> bool {
        matches!(self.kind(), ErrorKind::NotFound | ErrorKind::PermissionDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CredsError::not_found("app.terraform.io");
        assert_eq!(err.to_string(), "Credential not found: app.terraform.io");

        let err = CredsError::backend_unavailable("Azure Key Vault", "connection refused");
        assert_eq!(err.to_string(), "Azure Key Vault unavailable: connection refused");

        let err = CredsError::malformed_input("expected a JSON object");
        assert_eq!(err.to_string(), "Malformed input: expected a JSON object");
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(CredsError::not_found("x").kind(), ErrorKind::NotFound);
        assert_eq!(CredsError::permission_denied("x").kind(), ErrorKind::PermissionDenied);
        assert_eq!(CredsError::config("x").kind(), ErrorKind::Config);

        let io = CredsError::from(std::io::Error::other("disk"));
        assert_eq!(io.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_access_denied_covers_not_found_and_permission() {
        assert!(CredsError::not_found("x").is_access_denied());
        assert!(CredsError::permission_denied("x").is_access_denied());
        assert!(!CredsError::backend_unavailable("AWS", "x").is_access_denied());
        assert!(!CredsError::malformed_input("x").is_access_denied());
    }
}
