//! Account database access through the platform's passwd API.

use super::{Account, AccountSource, IdentityError};

/// [`AccountSource`] backed by the operating system's account database.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAccounts;

#[cfg(unix)]
impl AccountSource for SystemAccounts {
    fn current(&self) -> Result<Account, IdentityError> {
        // SAFETY: getuid has no preconditions and cannot fail.
        let uid = unsafe { libc::getuid() };

        let account = unix::by_uid(uid)
            .map_err(|e| IdentityError::CurrentUser {
                reason: e.to_string(),
            })?
            .ok_or_else(|| IdentityError::CurrentUser {
                reason: format!("no passwd entry for uid {uid}"),
            })?;

        // Fall back to $HOME when the passwd record lacks a home directory.
        Ok(Account {
            home: account.home.or_else(dirs::home_dir),
            ..account
        })
    }

    fn lookup(&self, name: &str) -> Result<Account, IdentityError> {
        let elevated = |reason: String| IdentityError::ElevatedUser {
            name: name.to_string(),
            reason,
        };

        unix::by_name(name)
            .map_err(|e| elevated(e.to_string()))?
            .ok_or_else(|| elevated("unknown user".to_string()))
    }
}

#[cfg(not(unix))]
impl AccountSource for SystemAccounts {
    fn current(&self) -> Result<Account, IdentityError> {
        // No numeric uids here; never the superuser.
        dirs::home_dir()
            .map(|home| Account::new("1000", Some(home)))
            .ok_or_else(|| IdentityError::CurrentUser {
                reason: "home directory unavailable".to_string(),
            })
    }

    fn lookup(&self, name: &str) -> Result<Account, IdentityError> {
        Err(IdentityError::ElevatedUser {
            name: name.to_string(),
            reason: "account lookup is not supported on this platform".to_string(),
        })
    }
}

#[cfg(unix)]
mod unix {
    use std::ffi::{CStr, CString, OsStr};
    use std::io;
    use std::os::raw::{c_char, c_int};
    use std::os::unix::ffi::OsStrExt;
    use std::path::PathBuf;

    use super::Account;

    const INITIAL_BUFFER: usize = 1024;
    const MAX_BUFFER: usize = 1 << 20;

    pub fn by_uid(uid: libc::uid_t) -> io::Result<Option<Account>> {
        query(|pwd, buf, result| {
            // SAFETY: all pointers are valid for the duration of the call and
            // `buf.len()` is the true buffer size.
            unsafe { libc::getpwuid_r(uid, pwd, buf.as_mut_ptr(), buf.len(), result) }
        })
    }

    pub fn by_name(name: &str) -> io::Result<Option<Account>> {
        let name = CString::new(name)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "name contains NUL"))?;

        query(|pwd, buf, result| {
            // SAFETY: see `by_uid`; `name` is NUL-terminated and outlives the call.
            unsafe { libc::getpwnam_r(name.as_ptr(), pwd, buf.as_mut_ptr(), buf.len(), result) }
        })
    }

    /// Runs a reentrant passwd query, growing the scratch buffer on `ERANGE`.
    fn query<F>(mut call: F) -> io::Result<Option<Account>>
    where
        F: FnMut(&mut libc::passwd, &mut [c_char], &mut *mut libc::passwd) -> c_int,
    {
        let mut buf: Vec<c_char> = vec![0; INITIAL_BUFFER];

        loop {
            // SAFETY: `passwd` is a plain C struct; all-zero is a valid value.
            let mut pwd: libc::passwd = unsafe { std::mem::zeroed() };
            let mut result: *mut libc::passwd = std::ptr::null_mut();

            let rc = call(&mut pwd, &mut buf, &mut result);

            if rc == libc::ERANGE && buf.len() < MAX_BUFFER {
                buf.resize(buf.len() * 2, 0);
                continue;
            }
            if rc != 0 {
                return Err(io::Error::from_raw_os_error(rc));
            }
            if result.is_null() {
                return Ok(None);
            }

            // SAFETY: on success the string fields point into `buf`, which is
            // still alive.
            return Ok(Some(unsafe { to_account(&pwd) }));
        }
    }

    unsafe fn to_account(pwd: &libc::passwd) -> Account {
        let home = if pwd.pw_dir.is_null() {
            None
        } else {
            // SAFETY: guaranteed by the caller.
            let raw = unsafe { CStr::from_ptr(pwd.pw_dir) };
            Some(raw.to_bytes())
                .filter(|bytes| !bytes.is_empty())
                .map(|bytes| PathBuf::from(OsStr::from_bytes(bytes)))
        };

        Account {
            uid: pwd.pw_uid.to_string(),
            home,
        }
    }
}
