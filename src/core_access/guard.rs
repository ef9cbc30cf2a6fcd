//! Path confinement and filesystem access predicates. Every target is
//! canonicalized and must stay under the configured root, so symlinks cannot
//! escape it. When an authenticated host uid is recorded the predicates also
//! check the target's permission bits against that uid (owner bits when the
//! uid owns the inode, world bits otherwise).

use std::fs::{self, Metadata, OpenOptions};
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

const R_BITS: u32 = 0o4;
const W_BITS: u32 = 0o2;
const X_BITS: u32 = 0o1;

#[derive(Debug, Clone)]
pub struct AccessGuard {
    root: PathBuf,
}

impl AccessGuard {
    /// `root` must already be canonical (the config layer guarantees it).
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Canonical form of `path` if it is a directory under the root that
    /// `uid` may enter and list.
    pub fn folder_access(&self, path: &Path, uid: Option<u32>) -> Option<PathBuf> {
        let canonical = path.canonicalize().ok()?;
        if !canonical.starts_with(&self.root) {
            return None;
        }
        let meta = canonical.metadata().ok()?;
        if !meta.is_dir() || !uid_allows(&meta, uid, R_BITS | X_BITS) {
            return None;
        }
        Some(canonical)
    }

    /// Canonical form of `path` if it is a regular file under the root that
    /// `uid` may read. Opens the file once to probe the OS-level permission.
    pub fn read_access(&self, path: &Path, uid: Option<u32>) -> Option<PathBuf> {
        let canonical = path.canonicalize().ok()?;
        if !canonical.starts_with(&self.root) {
            return None;
        }
        let meta = canonical.metadata().ok()?;
        if !meta.is_file() || !uid_allows(&meta, uid, R_BITS) {
            return None;
        }
        fs::File::open(&canonical).ok()?;
        Some(canonical)
    }

    /// Resolved form of `path` if `uid` may write (or create) it under the
    /// root. For a missing target the parent directory is what gets
    /// canonicalized and checked; the probe-open then creates the file, as
    /// the upload itself is about to anyway.
    pub fn write_access(&self, path: &Path, uid: Option<u32>) -> Option<PathBuf> {
        let resolved = match path.canonicalize() {
            Ok(canonical) => {
                if !canonical.starts_with(&self.root) {
                    return None;
                }
                let meta = canonical.metadata().ok()?;
                if !meta.is_file() || !uid_allows(&meta, uid, W_BITS) {
                    return None;
                }
                canonical
            }
            Err(_) => {
                let parent = path.parent()?.canonicalize().ok()?;
                if !parent.starts_with(&self.root) {
                    return None;
                }
                let meta = parent.metadata().ok()?;
                if !uid_allows(&meta, uid, W_BITS | X_BITS) {
                    return None;
                }
                parent.join(path.file_name()?)
            }
        };
        OpenOptions::new()
            .write(true)
            .create(true)
            .open(&resolved)
            .ok()?;
        Some(resolved)
    }

    /// Resolved form of a not-yet-existing `path` whose parent is a
    /// directory under the root that `uid` may create entries in.
    pub fn create_access(&self, path: &Path, uid: Option<u32>) -> Option<PathBuf> {
        let parent = path.parent()?.canonicalize().ok()?;
        if !parent.starts_with(&self.root) {
            return None;
        }
        let meta = parent.metadata().ok()?;
        if !meta.is_dir() || !uid_allows(&meta, uid, W_BITS | X_BITS) {
            return None;
        }
        Some(parent.join(path.file_name()?))
    }

    /// Canonical form of `path` if it is a regular file under the root that
    /// `uid` may unlink.
    pub fn delete_access(&self, path: &Path, uid: Option<u32>) -> Option<PathBuf> {
        let canonical = path.canonicalize().ok()?;
        if !canonical.starts_with(&self.root) {
            return None;
        }
        let meta = canonical.metadata().ok()?;
        if !meta.is_file() || !uid_allows(&meta, uid, W_BITS) {
            return None;
        }
        Some(canonical)
    }
}

fn uid_allows(meta: &Metadata, uid: Option<u32>, bits: u32) -> bool {
    match uid {
        None => true,
        Some(uid) if meta.uid() == uid => meta.mode() & (bits << 6) != 0,
        Some(_) => meta.mode() & bits != 0,
    }
}
