//! Remote time-tracking collaborator required by the logging pipeline.

use git_timelog_basecamp::{BasecampClient, BasecampError};
use git_timelog_core::{CandidateTask, TargetKind, TimeEntry};

/// How a time-tracking request failed, as far as the pipeline cares.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// Credentials or endpoint were refused.
    #[error("authentication failed")]
    Unauthorized,
    /// The service answered with validation errors (possibly none).
    #[error("request rejected")]
    Rejected(Vec<String>),
    /// Transport failures, malformed responses and everything else.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<BasecampError> for TrackerError {
    fn from(err: BasecampError) -> Self {
        match err {
            BasecampError::Unauthorized(_) => Self::Unauthorized,
            BasecampError::Rejected(errors) => Self::Rejected(errors),
            other => Self::Other(other.into()),
        }
    }
}

/// Project-management service that receives time entries.
pub trait TimeTracker {
    /// Id of the person the credentials belong to.
    ///
    /// # Errors
    /// Returns a [`TrackerError`] when the lookup fails.
    fn lookup_person_id(&self) -> Result<u64, TrackerError>;

    /// Incomplete tasks of the project, as selection candidates.
    ///
    /// # Errors
    /// Returns a [`TrackerError`] when the task list cannot be fetched.
    fn fetch_incomplete_tasks(&self, project_id: u64) -> Result<Vec<CandidateTask>, TrackerError>;

    /// File a time entry and return its id.
    ///
    /// # Errors
    /// Returns [`TrackerError::Rejected`] when the service refuses the entry.
    fn submit_time_entry(&self, target: TargetKind, entry: &TimeEntry) -> Result<u64, TrackerError>;

    /// Mark a task as completed.
    ///
    /// # Errors
    /// Returns a [`TrackerError`] when the task is not completed.
    fn mark_task_complete(&self, task_id: u64) -> Result<(), TrackerError>;
}

impl TimeTracker for BasecampClient {
    fn lookup_person_id(&self) -> Result<u64, TrackerError> {
        Ok(self.me()?)
    }

    fn fetch_incomplete_tasks(&self, project_id: u64) -> Result<Vec<CandidateTask>, TrackerError> {
        Ok(self.incomplete_tasks(project_id)?)
    }

    fn submit_time_entry(&self, target: TargetKind, entry: &TimeEntry) -> Result<u64, TrackerError> {
        Ok(self.create_time_entry(target, entry)?)
    }

    fn mark_task_complete(&self, task_id: u64) -> Result<(), TrackerError> {
        Ok(self.complete_task(task_id)?)
    }
}

impl<T> TimeTracker for &T
where
    T: TimeTracker + ?Sized,
{
    fn lookup_person_id(&self) -> Result<u64, TrackerError> {
        (*self).lookup_person_id()
    }

    fn fetch_incomplete_tasks(&self, project_id: u64) -> Result<Vec<CandidateTask>, TrackerError> {
        (*self).fetch_incomplete_tasks(project_id)
    }

    fn submit_time_entry(&self, target: TargetKind, entry: &TimeEntry) -> Result<u64, TrackerError> {
        (*self).submit_time_entry(target, entry)
    }

    fn mark_task_complete(&self, task_id: u64) -> Result<(), TrackerError> {
        (*self).mark_task_complete(task_id)
    }
}
