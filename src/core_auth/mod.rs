pub mod db;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("failed to read users file {0:?}: {1}")]
    Io(PathBuf, std::io::Error),
    #[error("users file line {0} is malformed")]
    BadFormat(usize),
}

/// Host credential check, keyed by the numeric user id a login name maps to.
/// The production seam for a system credential service; the default
/// implementation verifies against the users-file credentials in memory.
pub trait HostVerifier: Send + Sync {
    fn verify(&self, uid: u32, password: &str) -> bool;
}

struct FileVerifier {
    credentials: HashMap<u32, String>,
}

impl HostVerifier for FileVerifier {
    fn verify(&self, uid: u32, password: &str) -> bool {
        self.credentials.get(&uid).map(String::as_str) == Some(password)
    }
}

pub enum AuthDecision {
    /// Login accepted. `uid` is the host user id to run filesystem work as,
    /// when the principal maps to one.
    Granted { uid: Option<u32> },
    Denied,
}

pub struct Authenticator {
    /// `None` when authentication is disabled by configuration.
    users: Option<HashMap<String, String>>,
    verifier: Arc<dyn HostVerifier>,
}

impl Authenticator {
    pub fn disabled() -> Self {
        Self {
            users: None,
            verifier: Arc::new(FileVerifier {
                credentials: HashMap::new(),
            }),
        }
    }

    pub fn from_users_file(path: &Path) -> Result<Self, AuthError> {
        let users = db::read_users_file(path)?;
        let credentials = users
            .iter()
            .filter_map(|(name, cred)| Some((name.parse().ok()?, cred.clone())))
            .collect();
        Ok(Self {
            users: Some(users),
            verifier: Arc::new(FileVerifier { credentials }),
        })
    }

    #[cfg(test)]
    pub fn with_verifier(mut self, verifier: Arc<dyn HostVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    /// Whether `USER` must be followed by `PASS`.
    pub fn login_required(&self) -> bool {
        self.users.is_some()
    }

    /// Validates a `USER`/`PASS` pair. Principals must be listed in the users
    /// file and name a host uid (an all-digit login); `anonymous` is accepted
    /// unconditionally and maps to no uid.
    pub fn check_password(&self, username: &str, password: &str) -> AuthDecision {
        if username == "anonymous" {
            return AuthDecision::Granted { uid: None };
        }
        let Some(users) = &self.users else {
            return AuthDecision::Granted { uid: None };
        };
        if !users.contains_key(username) {
            return AuthDecision::Denied;
        }
        if username.is_empty() || !username.bytes().all(|b| b.is_ascii_digit()) {
            return AuthDecision::Denied;
        }
        let Ok(uid) = username.parse::<u32>() else {
            return AuthDecision::Denied;
        };
        if self.verifier.verify(uid, password) {
            AuthDecision::Granted { uid: Some(uid) }
        } else {
            AuthDecision::Denied
        }
    }
}
