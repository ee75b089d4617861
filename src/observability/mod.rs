//! # Observability
//!
//! Structured logging for the helper. See [`logging`] for the subscriber
//! layout and the `credential_span!` macro.

pub mod logging;

pub use logging::{expand_home, init_logging, log_file_path, LOG_FILE_NAME};
