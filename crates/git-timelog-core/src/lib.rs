//! Commit-tag grammar and time computations for git-timelog.
//!
//! Everything here is pure: the crate never touches Git, the network or the
//! terminal. Callers feed it commit snapshots and candidate tasks and get back
//! directives, durations, selections and time-entry payloads.

/// Commit snapshots read from the version-control log.
pub mod commit;
/// `[BC...]` tag parsing.
pub mod directive;
/// Elapsed-time computation and `H:MM` rendering.
pub mod duration;
/// Time-entry payload construction.
pub mod entry;
/// Filter-based task selection.
pub mod selector;

pub use commit::CommitRecord;
pub use directive::{Directive, TaskSpec, TermMatcher, TimeSpec};
pub use duration::{DurationError, ResolvedDuration, resolve_duration};
pub use entry::{TargetKind, TimeEntry, escape_markup};
pub use selector::{CandidateTask, Selected, SelectionError, select_task};
