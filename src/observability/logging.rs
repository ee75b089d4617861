//! # Structured Logging
//!
//! Console output goes to stderr so stdout stays reserved for the JSON
//! exchanged with Terraform. When `logging.enabled` is set, events at `info`
//! and above are also appended to `<logging.path>/terracreds.log`.

use crate::config::LoggingConfig;
use crate::errors::Result;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

pub const LOG_FILE_NAME: &str = "terracreds.log";

/// Create a tracing span for one credential operation.
///
/// ```rust,ignore
/// let span = credential_span!("get", "app.terraform.io");
/// ```
#[macro_export]
macro_rules! credential_span {
    ($operation:expr, $secret:expr) => {
        tracing::info_span!(
            "credential",
            operation = %$operation,
            secret = %$secret
        )
    };
    ($operation:expr, $secret:expr, $($field:tt)*) => {
        tracing::info_span!(
            "credential",
            operation = %$operation,
            secret = %$secret,
            $($field)*
        )
    };
}

/// Replace a leading `~` with the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    let home = || std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")).ok();

    if path == "~" {
        if let Some(home) = home() {
            return PathBuf::from(home);
        }
    } else if let Some(rest) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home() {
            return Path::new(&home).join(rest);
        }
    }
    PathBuf::from(path)
}

/// Location of the log file, or `None` when file logging is off.
pub fn log_file_path(logging: &LoggingConfig) -> Option<PathBuf> {
    if !logging.enabled {
        return None;
    }

    let dir = if logging.path.trim().is_empty() {
        PathBuf::from(".")
    } else {
        expand_home(logging.path.trim())
    };
    Some(dir.join(LOG_FILE_NAME))
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be kept alive
/// until the process exits.
pub fn init_logging(verbose: bool, logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let default_level = if verbose { "debug" } else { "warn" };
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_filter);

    let (file, guard) = match log_file_path(logging) {
        Some(path) => {
            let dir = path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
            std::fs::create_dir_all(&dir)?;

            let appender = tracing_appender::rolling::never(&dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer =
                fmt::layer().with_writer(writer).with_ansi(false).with_filter(LevelFilter::INFO);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry().with(console).with(file);
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // Subscriber already set elsewhere (e.g. integration tests); ignore.
    }

    Ok(guard)
}
