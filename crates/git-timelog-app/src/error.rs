//! Terminal failures of a logging run and their exit statuses.

use git_timelog_core::CandidateTask;

use crate::config::{API_ENDPOINT_KEY, API_TOKEN_KEY, PROJECT_ID_KEY};

/// Exit status of a successful run, including commits without a tag.
pub const EXIT_OK: i32 = 0;
/// Exit status when the time entry was filed but the task could not be completed.
pub const EXIT_COMPLETION_FAILED: i32 = 9;
/// Exit status for failures outside the named kinds.
pub const EXIT_OTHER: i32 = 42;

/// Every way a run can abort. None of them is retried.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// `basecamp.api-endpoint` is not configured.
    #[error(
        "Missing API endpoint: use git config --global --add {} your-account-url-here",
        API_ENDPOINT_KEY
    )]
    MissingApiEndpoint,

    /// `basecamp.api-token` is not configured.
    #[error(
        "Missing API token: use git config --global --add {} your-api-token-here",
        API_TOKEN_KEY
    )]
    MissingApiToken,

    /// `basecamp.project-id` is not configured.
    #[error(
        "Missing project ID: use git config --add {} your-project-id-here",
        PROJECT_ID_KEY
    )]
    MissingProjectId,

    /// A configured value cannot be used.
    #[error("Invalid value {value:?} for {key}")]
    InvalidSetting {
        /// Git config key.
        key: &'static str,
        /// Offending value.
        value: String,
    },

    /// A delta was requested on the first commit of the repository.
    #[error("Can't compute a time delta: no previous commit!")]
    NoPreviousCommit,

    /// Task auto-selection found nothing.
    #[error("No incomplete task matches: specify the task ID or a different set of words")]
    NoMatchingTask,

    /// Task auto-selection found several tasks.
    #[error(
        "Too many tasks to choose from: either specify the task ID or a set of words to narrow down task descriptions"
    )]
    AmbiguousTask(Vec<CandidateTask>),

    /// The service refused the credentials or endpoint.
    #[error("Invalid API token (probably): a request failed.")]
    AuthenticationFailure,

    /// The service refused the time entry.
    #[error("Errors encountered:\n{}", bullet_list(.0))]
    SubmissionRejected(Vec<String>),

    /// Reading or rewriting the repository failed.
    #[error("Repository error: {0:#}")]
    Git(anyhow::Error),

    /// The service could not be reached or answered nonsense.
    #[error("Service error: {0:#}")]
    Service(anyhow::Error),
}

impl RunError {
    /// Stable process exit status for this failure.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::AuthenticationFailure => 1,
            Self::MissingApiEndpoint => 2,
            Self::MissingApiToken => 3,
            Self::MissingProjectId => 4,
            Self::NoPreviousCommit => 5,
            Self::NoMatchingTask => 6,
            Self::AmbiguousTask(_) => 7,
            Self::SubmissionRejected(_) => 8,
            Self::InvalidSetting { .. } | Self::Git(_) | Self::Service(_) => EXIT_OTHER,
        }
    }
}

/// `* message` lines, or the generic message when the service gave none.
#[must_use]
pub fn bullet_list(errors: &[String]) -> String {
    if errors.is_empty() {
        return "A non-specific error occurred, sorry.".to_owned();
    }
    errors
        .iter()
        .map(|error| format!("* {error}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn exit_codes_are_distinct_per_kind() {
        let errors = [
            RunError::AuthenticationFailure,
            RunError::MissingApiEndpoint,
            RunError::MissingApiToken,
            RunError::MissingProjectId,
            RunError::NoPreviousCommit,
            RunError::NoMatchingTask,
            RunError::AmbiguousTask(Vec::new()),
            RunError::SubmissionRejected(Vec::new()),
            RunError::Service(anyhow::anyhow!("down")),
        ];
        let codes: HashSet<i32> = errors.iter().map(RunError::exit_code).collect();
        assert_eq!(codes.len(), errors.len());
        assert!(!codes.contains(&EXIT_OK));
        assert!(!codes.contains(&EXIT_COMPLETION_FAILED));
    }

    #[test]
    fn rejection_lists_service_messages() {
        let err = RunError::SubmissionRejected(vec!["Hours can't be blank".into(), "Bad date".into()]);
        assert_eq!(
            err.to_string(),
            "Errors encountered:\n* Hours can't be blank\n* Bad date"
        );
        assert_eq!(
            RunError::SubmissionRejected(Vec::new()).to_string(),
            "Errors encountered:\nA non-specific error occurred, sorry."
        );
    }

    #[test]
    fn missing_settings_explain_the_fix() {
        assert!(RunError::MissingProjectId
            .to_string()
            .contains("git config --add basecamp.project-id"));
    }
}
