//! The post-commit logging pipeline.
//!
//! A run is split in two phases. [`TimeLogger::prepare`] only reads the
//! repository: it parses the tag, loads settings, resolves the duration and
//! decides how the task will be found. [`TimeLogger::execute`] then talks to
//! the time tracker and finally rewrites the commit message.

use git_timelog_core::{
    CommitRecord, Directive, DurationError, ResolvedDuration, Selected, SelectionError, TargetKind,
    TimeEntry, resolve_duration, select_task,
};
use time::{Date, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::config::{HookOptions, PERSON_ID_KEY, Settings};
use crate::error::{EXIT_COMPLETION_FAILED, EXIT_OK, RunError};
use crate::repository::{CommitLog, ConfigStore};
use crate::tracker::{TimeTracker, TrackerError};

/// How the task to log against will be determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskTarget {
    /// Log against the project itself.
    Project,
    /// Task id given by the tag or by `basecamp.current-task-id`.
    Known(u64),
    /// Pick the single incomplete task matching the tag's filter.
    Select,
}

/// Everything decided before the first network request.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Latest commit.
    pub commit: CommitRecord,
    /// Parsed tag.
    pub directive: Directive,
    /// Credentials and identifiers.
    pub settings: Settings,
    /// Time to log.
    pub duration: ResolvedDuration,
    /// Task resolution strategy.
    pub task: TaskTarget,
}

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Logged time.
    pub duration: ResolvedDuration,
    /// Where the time entry was filed.
    pub target: TargetKind,
    /// Id of the created time entry.
    pub entry_id: u64,
    /// Task picked by filter, if selection took place.
    pub selected: Option<Selected>,
    /// Completion result, when the tag asked for it.
    pub completion: Option<Result<(), Vec<String>>>,
    /// Whether the commit message was rewritten.
    pub amended: bool,
}

impl Report {
    /// True when completion was requested and did not go through.
    #[must_use]
    pub const fn completion_failed(&self) -> bool {
        matches!(self.completion, Some(Err(_)))
    }
}

/// Result of [`TimeLogger::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The latest commit carries no tag.
    Skipped,
    /// Time was logged.
    Logged(Report),
}

impl Outcome {
    /// Process exit status for this outcome.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Logged(report) if report.completion_failed() => EXIT_COMPLETION_FAILED,
            Self::Skipped | Self::Logged(_) => EXIT_OK,
        }
    }
}

/// Drives one logging run against a repository.
pub struct TimeLogger<'a, R> {
    repo: &'a R,
    options: HookOptions,
    today: Date,
}

impl<'a, R> TimeLogger<'a, R>
where
    R: CommitLog + ConfigStore,
{
    /// Create a logger dating entries with `today`.
    #[must_use]
    pub const fn new(repo: &'a R, options: HookOptions, today: Date) -> Self {
        Self {
            repo,
            options,
            today,
        }
    }

    /// Full run: prepare, connect with the loaded settings, execute.
    ///
    /// # Errors
    /// Returns the first [`RunError`] met along the pipeline.
    pub fn run<T, F>(&self, connect: F) -> Result<Outcome, RunError>
    where
        T: TimeTracker,
        F: FnOnce(&Settings) -> Result<T, RunError>,
    {
        let Some(plan) = self.prepare()? else {
            return Ok(Outcome::Skipped);
        };
        let tracker = connect(&plan.settings)?;
        self.execute(plan, &tracker).map(Outcome::Logged)
    }

    /// Read-only phase. Returns `None` when the latest commit has no tag.
    ///
    /// # Errors
    /// Fails on repository errors, missing settings, or a delta requested on
    /// the first commit.
    pub fn prepare(&self) -> Result<Option<Plan>, RunError> {
        let Some(commit) = self.commit(0)? else {
            debug!("no commit to inspect");
            return Ok(None);
        };
        let Some(directive) = Directive::parse(&commit.message) else {
            debug!(hash = %commit.short_hash, "commit carries no time tag");
            return Ok(None);
        };
        debug!(hash = %commit.short_hash, ?directive, "parsed time tag");

        let settings = Settings::load(self.repo)?;

        let previous = if directive.time().needs_previous_commit() {
            self.commit(1)?.map(|record| record.timestamp)
        } else {
            None
        };
        let duration = resolve_duration(directive.time(), commit.timestamp, previous).map_err(
            |err| match err {
                DurationError::NoPreviousCommit => RunError::NoPreviousCommit,
            },
        )?;

        let task = if let Some(id) = directive.task_id().or(settings.current_task_id) {
            TaskTarget::Known(id)
        } else if directive.task_mode() {
            TaskTarget::Select
        } else {
            TaskTarget::Project
        };

        Ok(Some(Plan {
            commit,
            directive,
            settings,
            duration,
            task,
        }))
    }

    /// Network phase: file the entry, complete the task, amend the commit.
    ///
    /// # Errors
    /// Fails on authentication problems, task selection failures or a
    /// rejected time entry. A failed completion is reported in the
    /// [`Report`] instead.
    pub fn execute<T: TimeTracker>(&self, plan: Plan, tracker: &T) -> Result<Report, RunError> {
        let Plan {
            commit,
            directive,
            settings,
            duration,
            task,
        } = plan;

        let person_id = self.person_id(&settings, tracker)?;
        info!(%duration, "Logging work");

        let (target, selected) = match task {
            TaskTarget::Project => (TargetKind::Project(settings.project_id), None),
            TaskTarget::Known(id) => (TargetKind::Task(id), None),
            TaskTarget::Select => {
                let candidates = tracker
                    .fetch_incomplete_tasks(settings.project_id)
                    .map_err(service_error)?;
                debug!(count = candidates.len(), "fetched incomplete tasks");
                let selected = select_task(directive.filter_terms(), candidates).map_err(|err| match err {
                    SelectionError::NoMatch => RunError::NoMatchingTask,
                    SelectionError::Ambiguous(candidates) => RunError::AmbiguousTask(candidates),
                })?;
                info!(task = selected.task().id, "auto-selected task");
                (TargetKind::Task(selected.task().id), Some(selected))
            }
        };

        let entry = TimeEntry::new(
            person_id,
            self.today,
            duration,
            directive.message(),
            &commit.short_hash,
        );
        let entry_id = tracker
            .submit_time_entry(target, &entry)
            .map_err(|err| match err {
                TrackerError::Rejected(errors) => RunError::SubmissionRejected(errors),
                other => service_error(other),
            })?;
        info!(entry_id, %target, "time entry created");

        let completion = match target.task_id() {
            Some(task_id) if directive.auto_complete() => Some(Self::complete(tracker, task_id)),
            _ => None,
        };

        let amended = self.strip_tag(&directive)?;

        Ok(Report {
            duration,
            target,
            entry_id,
            selected,
            completion,
            amended,
        })
    }

    fn commit(&self, skip: usize) -> Result<Option<CommitRecord>, RunError> {
        self.repo
            .commit(skip)
            .map_err(|err| RunError::Git(err.into()))
    }

    fn person_id<T: TimeTracker>(&self, settings: &Settings, tracker: &T) -> Result<u64, RunError> {
        if self.options.cache_person_id
            && let Some(id) = settings.person_id
        {
            return Ok(id);
        }

        // Any lookup failure means bad credentials or a wrong endpoint.
        let id = tracker.lookup_person_id().map_err(|err| {
            warn!(error = %err, "person lookup failed");
            RunError::AuthenticationFailure
        })?;

        if self.options.cache_person_id
            && let Err(err) = self.repo.set_global_value(PERSON_ID_KEY, &id.to_string())
        {
            let err: anyhow::Error = err.into();
            warn!(error = %err, "failed to cache person id");
        }
        Ok(id)
    }

    fn complete<T: TimeTracker>(tracker: &T, task_id: u64) -> Result<(), Vec<String>> {
        match tracker.mark_task_complete(task_id) {
            Ok(()) => {
                info!(task_id, "task completed");
                Ok(())
            }
            Err(TrackerError::Rejected(errors)) => {
                warn!(task_id, ?errors, "task completion rejected");
                Err(errors)
            }
            Err(err) => {
                warn!(task_id, error = %err, "task completion failed");
                Err(vec![format!("{err:#}")])
            }
        }
    }

    fn strip_tag(&self, directive: &Directive) -> Result<bool, RunError> {
        if !self.options.strip_tag {
            return Ok(false);
        }
        if directive.message().trim().is_empty() {
            debug!("tag-only message; leaving commit untouched");
            return Ok(false);
        }
        self.repo
            .amend_last_commit_message(directive.message())
            .map_err(|err| RunError::Git(err.into()))?;
        Ok(true)
    }
}

fn service_error(err: TrackerError) -> RunError {
    match err {
        TrackerError::Unauthorized => RunError::AuthenticationFailure,
        TrackerError::Rejected(errors) => RunError::Service(anyhow::anyhow!(
            "request rejected: {}",
            errors.join("; ")
        )),
        TrackerError::Other(err) => RunError::Service(err),
    }
}

/// Current local date, falling back to UTC when the offset is unknown.
#[must_use]
pub fn today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}
