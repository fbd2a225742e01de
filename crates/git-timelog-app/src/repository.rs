//! Version-control collaborators required by the logging pipeline.

use anyhow::Error;
use git_timelog_core::CommitRecord;
use git_timelog_store_git::{GitLog, GitStoreError};

pub use git_timelog_store_git::Scope;

/// Read access to commit history plus the final message rewrite.
pub trait CommitLog {
    /// Error type bubbled up from the backing repository.
    type Error: Into<Error>;

    /// Commit `skip` positions back from `HEAD`, or `None` past the first commit.
    ///
    /// # Errors
    /// Returns a repository-specific error when history cannot be read.
    fn commit(&self, skip: usize) -> Result<Option<CommitRecord>, Self::Error>;

    /// Replace the message of the latest commit.
    ///
    /// # Errors
    /// Returns a repository-specific error when the commit cannot be rewritten.
    fn amend_last_commit_message(&self, message: &str) -> Result<(), Self::Error>;
}

/// Key/value configuration storage (Git config).
pub trait ConfigStore {
    /// Error type bubbled up from the backing store.
    type Error: Into<Error>;

    /// Read a value; blank values are reported as `None`.
    ///
    /// # Errors
    /// Returns a store-specific error when the configuration cannot be read.
    fn config_value(&self, key: &str, scope: Scope) -> Result<Option<String>, Self::Error>;

    /// Persist a value in the global configuration.
    ///
    /// # Errors
    /// Returns a store-specific error when the value cannot be written.
    fn set_global_value(&self, key: &str, value: &str) -> Result<(), Self::Error>;
}

impl CommitLog for GitLog {
    type Error = GitStoreError;

    fn commit(&self, skip: usize) -> Result<Option<CommitRecord>, Self::Error> {
        Self::commit(self, skip)
    }

    fn amend_last_commit_message(&self, message: &str) -> Result<(), Self::Error> {
        self.amend_head_message(message).map(|_| ())
    }
}

impl ConfigStore for GitLog {
    type Error = GitStoreError;

    fn config_value(&self, key: &str, scope: Scope) -> Result<Option<String>, Self::Error> {
        Self::config_value(self, key, scope)
    }

    fn set_global_value(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        Self::set_global_value(self, key, value)
    }
}
