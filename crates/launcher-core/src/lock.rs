//! Cross-process install lock.
//!
//! Two launchers started in the same project would otherwise both spawn the
//! package manager against the same dependency directory. The lock file lives
//! in the system temp directory, keyed by a hash of the project root, so the
//! project tree itself is never touched.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use sha2::{Digest, Sha256};

use crate::error::Result;

/// Exclusive lock over one project's install step. Released on drop.
#[derive(Debug)]
pub struct InstallLock {
    path: PathBuf,
    file: File,
}

impl InstallLock {
    /// Lock file location for `root`.
    pub fn path_for(root: &Path) -> PathBuf {
        let canonical = std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
        let digest = Sha256::digest(canonical.to_string_lossy().as_bytes());
        let hex = format!("{digest:x}");
        std::env::temp_dir().join(format!("launcher-{}.lock", &hex[..16]))
    }

    /// Block until the lock for `root` is held.
    pub fn acquire(root: &Path) -> Result<Self> {
        let path = Self::path_for(root);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        // Blocks if another launcher holds the lock
        file.lock_exclusive()?;
        tracing::debug!(path = %path.display(), "install lock acquired");
        Ok(Self { path, file })
    }

    /// Acquire on the blocking pool so the runtime thread is not parked.
    pub async fn acquire_async(root: &Path) -> Result<Self> {
        let root = root.to_path_buf();
        tokio::task::spawn_blocking(move || Self::acquire(&root))
            .await
            .map_err(std::io::Error::other)?
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstallLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::debug!(path = %self.path.display(), error = %e, "failed to release install lock");
        }
    }
}
