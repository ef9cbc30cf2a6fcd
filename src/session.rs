use std::path::{Path, PathBuf};

use crate::core_access::AccessGuard;
use crate::core_network::data::DataConnection;
use crate::core_streams::ModeType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    PreAuth,
    NeedPassword,
    Authenticated,
}

/// Transfer type selected with the TYPE command. Both accepted types move
/// bytes verbatim; the distinction is kept for protocol conformance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferType {
    AsciiNonPrint,
    Local8,
}

/// Per-control-connection state. Constructed after accept, dropped when the
/// control stream closes (which also aborts any running transfer worker).
pub struct Session {
    pub username: Option<String>,
    /// Host uid recorded by the authenticator; filesystem predicates and
    /// transfer workers honor it.
    pub uid: Option<u32>,
    pub phase: AuthPhase,
    pub guard: AccessGuard,
    /// Current directory, relative to the root. Empty means the root itself.
    pub current_dir: PathBuf,
    pub transfer_type: TransferType,
    pub mode: ModeType,
    pub data: DataConnection,
}

impl Session {
    pub fn new(guard: AccessGuard) -> Self {
        Self {
            username: None,
            uid: None,
            phase: AuthPhase::PreAuth,
            guard,
            current_dir: PathBuf::new(),
            transfer_type: TransferType::AsciiNonPrint,
            mode: ModeType::Stream,
            data: DataConnection::new(),
        }
    }

    pub fn login(&mut self, uid: Option<u32>) {
        self.phase = AuthPhase::Authenticated;
        self.uid = uid;
        self.data.set_uid(uid);
    }

    /// Absolute arguments are re-rooted under the working root; relative ones
    /// resolve against the current directory.
    pub fn resolve_path(&self, arg: &str) -> PathBuf {
        match arg.strip_prefix('/') {
            Some(stripped) => self.guard.root().join(stripped),
            None => self.cwd_path().join(arg),
        }
    }

    pub fn cwd_path(&self) -> PathBuf {
        self.guard.root().join(&self.current_dir)
    }

    /// Records a new current directory. `canonical` must already be confined
    /// to the root (the access guard produced it).
    pub fn set_current_dir(&mut self, canonical: &Path) {
        self.current_dir = canonical
            .strip_prefix(self.guard.root())
            .map(Path::to_path_buf)
            .unwrap_or_default();
    }
}
