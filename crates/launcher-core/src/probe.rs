//! Existence check for the installed extension package.

use std::path::Path;

/// Result of looking for the package directory.
///
/// Only [`ProbeOutcome::Present`] lets the bootstrap skip installation. The
/// other variants all count as absent, but stay distinct so the reason shows
/// up in debug logs.
#[derive(Debug)]
pub enum ProbeOutcome {
    /// A readable directory exists at the package location.
    Present,
    /// Nothing exists at the package location.
    Missing,
    /// Something exists there, but it is not a directory.
    NotADirectory,
    /// The location could not be inspected (permissions, broken symlink, ...).
    Inaccessible(std::io::Error),
}

impl ProbeOutcome {
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present)
    }
}

/// Check whether `package_dir` exists and is a readable directory.
///
/// Never fails: probing is a best-effort existence test, not validation of
/// the package contents.
pub fn probe(package_dir: &Path) -> ProbeOutcome {
    let outcome = match std::fs::metadata(package_dir) {
        Ok(meta) if meta.is_dir() => match std::fs::read_dir(package_dir) {
            Ok(_) => ProbeOutcome::Present,
            Err(e) => ProbeOutcome::Inaccessible(e),
        },
        Ok(_) => ProbeOutcome::NotADirectory,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => ProbeOutcome::Missing,
        Err(e) => ProbeOutcome::Inaccessible(e),
    };

    tracing::debug!(path = %package_dir.display(), ?outcome, "probed extension package");
    outcome
}
