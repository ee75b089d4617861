//! Secret name resolution and sanitization.

use crate::config::Config;

/// Canonical secret name for this invocation.
///
/// A configured override replaces the caller-supplied name. The first
/// non-empty override wins: AWS, then Azure, then HashiCorp. The rule does not
/// depend on which backend ends up being used.
pub fn resolve_secret_name(config: &Config, supplied: &str) -> String {
    [&config.aws.secret_name, &config.azure.secret_name, &config.hashicorp.secret_name]
        .into_iter()
        .find(|name| !name.is_empty())
        .cloned()
        .unwrap_or_else(|| supplied.to_string())
}

/// Replace every `.` with `-`, for backends that reject dots in names.
pub fn sanitize_secret_name(name: &str) -> String {
    name.replace('.', "-")
}
