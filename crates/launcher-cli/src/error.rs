//! Error types for launcher-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that end the launcher with a diagnostic
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from launcher-core
    #[error(transparent)]
    Core(#[from] launcher_core::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
