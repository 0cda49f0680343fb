//! Effective identity resolution.
//!
//! Determines which user id and home directory drive path defaults. When the
//! process runs as root via `sudo`, the invoking human (from `SUDO_USER`) is
//! used instead of root, so defaults never silently point at `/root`.

mod passwd;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use passwd::SystemAccounts;

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// User id of the superuser account.
pub const SUPERUSER_ID: &str = "0";

/// Environment variable naming the account that elevated via `sudo`.
pub const ELEVATION_VAR: &str = "SUDO_USER";

/// A single record from the account database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Numeric user id, rendered as a string.
    pub uid: String,
    /// Home directory, if the record has one.
    pub home: Option<PathBuf>,
}

impl Account {
    /// Creates an account record.
    #[must_use]
    pub fn new(uid: impl Into<String>, home: Option<PathBuf>) -> Self {
        Self {
            uid: uid.into(),
            home,
        }
    }
}

/// Errors from identity resolution.
///
/// Every variant is fatal: without a trustworthy identity the path defaults
/// would be wrong.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The current user could not be determined.
    #[error("Unable to determine current user: {reason}")]
    CurrentUser {
        /// Why the lookup failed
        reason: String,
    },

    /// The account named by `SUDO_USER` could not be looked up.
    #[error("Unable to lookup sudo user '{name}': {reason}")]
    ElevatedUser {
        /// The account name from the environment
        name: String,
        /// Why the lookup failed
        reason: String,
    },
}

/// Access to the operating system's account database.
///
/// Abstracted so the resolution algorithm can be exercised without touching
/// real accounts.
pub trait AccountSource {
    /// Returns the record for the user running this process.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::CurrentUser`] if the record cannot be read.
    fn current(&self) -> Result<Account, IdentityError>;

    /// Looks up an account by login name.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::ElevatedUser`] if the account does not exist
    /// or the database cannot be read.
    fn lookup(&self, name: &str) -> Result<Account, IdentityError>;
}

/// The user id and home directory used for every path default.
///
/// Derived once at startup and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveIdentity {
    user_id: String,
    home_dir: Option<PathBuf>,
}

impl EffectiveIdentity {
    /// Creates an identity from its parts.
    #[must_use]
    pub fn new(user_id: impl Into<String>, home_dir: Option<PathBuf>) -> Self {
        Self {
            user_id: user_id.into(),
            home_dir,
        }
    }

    /// Returns the effective user id.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Returns the effective home directory, if known.
    #[must_use]
    pub fn home_dir(&self) -> Option<&Path> {
        self.home_dir.as_deref()
    }

    /// Returns `true` if the effective user is the superuser.
    #[must_use]
    pub fn is_superuser(&self) -> bool {
        self.user_id == SUPERUSER_ID
    }

    /// Classifies this identity for default computation.
    #[must_use]
    pub fn invocation(&self) -> Invocation<'_> {
        if self.is_superuser() {
            Invocation::Superuser
        } else {
            Invocation::User {
                home: self.home_dir(),
            }
        }
    }
}

impl fmt::Display for EffectiveIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.home_dir {
            Some(home) => write!(f, "uid={} home={}", self.user_id, home.display()),
            None => write!(f, "uid={} home=<unknown>", self.user_id),
        }
    }
}

/// How the process was invoked, as far as defaults are concerned.
///
/// Computed once from the [`EffectiveIdentity`] and passed explicitly to
/// the code that derives defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invocation<'a> {
    /// Running as root (and not on behalf of a `sudo` user).
    Superuser,
    /// Running as a regular account.
    User {
        /// The account's home directory, if known
        home: Option<&'a Path>,
    },
}

/// Resolves the effective identity from the real account database and
/// process environment.
///
/// # Errors
///
/// Returns an error if the current user cannot be determined, or if
/// `SUDO_USER` names an account that cannot be looked up while running as
/// root.
pub fn resolve() -> Result<EffectiveIdentity, IdentityError> {
    let elevation = std::env::var(ELEVATION_VAR).ok();
    resolve_with(&SystemAccounts, elevation.as_deref())
}

/// Resolves the effective identity using the given account source.
///
/// `elevated_by` is the value of the elevation variable, if any. It is only
/// consulted when the current user is the superuser.
///
/// # Errors
///
/// See [`resolve`].
pub fn resolve_with<A: AccountSource + ?Sized>(
    accounts: &A,
    elevated_by: Option<&str>,
) -> Result<EffectiveIdentity, IdentityError> {
    let current = accounts.current()?;

    let account = match elevated_by {
        Some(name) if current.uid == SUPERUSER_ID && !name.is_empty() => {
            let account = accounts.lookup(name)?;
            tracing::debug!("Running elevated on behalf of '{name}' (uid {})", account.uid);
            account
        }
        _ => current,
    };

    Ok(EffectiveIdentity::new(account.uid, account.home))
}
