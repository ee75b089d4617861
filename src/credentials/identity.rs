//! Identity of the user running the helper.

use crate::errors::{CredsError, Result};

/// The OS account on whose behalf credentials are read and written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub username: String,
}

impl CurrentUser {
    pub fn new(username: impl Into<String>) -> Self {
        Self { username: username.into() }
    }

    /// Ask the operating system for the account owning this process.
    ///
    /// Environment variables such as `USER` are not consulted; they are unset
    /// in many containers and any caller can overwrite them.
    pub fn from_os() -> Result<Self> {
        let username = whoami::fallible::username().map_err(|e| {
            CredsError::config(format!("Unable to determine the current user: {}", e))
        })?;

        if username.trim().is_empty() {
            return Err(CredsError::config("Unable to determine the current user"));
        }
        Ok(Self::new(username))
    }

    /// True when `owner` names this user. Windows owners may carry a
    /// `DOMAIN\` prefix which is ignored.
    pub fn owns(&self, owner: &str) -> bool {
        let bare = owner.rsplit('\\').next().unwrap_or(owner);
        owner == self.username || bare.eq_ignore_ascii_case(&self.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGIN_VARS: [&str; 3] = ["USER", "USERNAME", "LOGNAME"];

    #[test]
    fn test_owns() {
        let user = CurrentUser::new("alice");
        assert!(user.owns("alice"));
        assert!(user.owns("CORP\\alice"));
        assert!(!user.owns("bob"));
        assert!(!user.owns(""));
    }

    #[test]
    fn test_from_os_ignores_login_variables() {
        let saved: Vec<_> = LOGIN_VARS.iter().map(|var| (*var, std::env::var_os(var))).collect();

        for var in LOGIN_VARS {
            std::env::set_var(var, "spoofed-user");
        }
        let with_spoofed = CurrentUser::from_os();

        for var in LOGIN_VARS {
            std::env::remove_var(var);
        }
        let without_vars = CurrentUser::from_os();

        for (var, value) in saved {
            match value {
                Some(value) => std::env::set_var(var, value),
                None => std::env::remove_var(var),
            }
        }

        let user = without_vars.expect("lookup must not depend on USER/USERNAME/LOGNAME");
        assert!(!user.username.is_empty());
        assert_ne!(user.username, "spoofed-user");
        assert_eq!(with_spoofed.unwrap(), user);
    }
}
