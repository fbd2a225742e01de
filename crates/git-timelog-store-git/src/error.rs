//! Error types for git-timelog repository access.

use thiserror::Error;

/// Errors that can occur while reading or rewriting the repository.
#[derive(Error, Debug)]
pub enum GitStoreError {
    /// Git repository error.
    #[error("Git repository error: {0}")]
    GitError(#[from] git2::Error),

    /// `HEAD` does not point at a commit yet.
    #[error("No commit to amend: HEAD is unborn")]
    UnbornHead,

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result alias for repository operations.
pub type Result<T> = std::result::Result<T, GitStoreError>;
