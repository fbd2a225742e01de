//! Application layer for git-timelog: settings, collaborator traits and the
//! logging pipeline run by the post-commit hook.

/// Project options and Git-config settings.
pub mod config;
/// Run failures and exit statuses.
pub mod error;
/// Commit-log and configuration collaborators.
pub mod repository;
/// The tag-to-time-entry pipeline.
pub mod runner;
/// Time-tracking service collaborator.
pub mod tracker;

pub use config::{HookOptions, ProjectConfig, Settings};
pub use error::{EXIT_COMPLETION_FAILED, EXIT_OK, EXIT_OTHER, RunError, bullet_list};
pub use repository::{CommitLog, ConfigStore, Scope};
pub use runner::{Outcome, Plan, Report, TaskTarget, TimeLogger, today};
pub use tracker::{TimeTracker, TrackerError};
