//! End-to-end checks from a raw commit message to the logged entry.

use git_timelog_core::{
    CandidateTask, CommitRecord, Directive, DurationError, SelectionError, TimeEntry, resolve_duration,
    select_task,
};
use time::macros::date;

const T0: i64 = 1_283_760_000;

fn directive(message: &str) -> Directive {
    Directive::parse(message).unwrap_or_else(|| panic!("expected a tag in {message:?}"))
}

#[test]
fn bare_tag_logs_rounded_delta() -> Result<(), DurationError> {
    let current = CommitRecord::new("abc1234", T0 + 45 * 60 + 40, "Fix bug [BC]");
    let parsed = directive(&current.message);
    let duration = resolve_duration(parsed.time(), current.timestamp, Some(T0))?;
    assert_eq!(duration.minutes(), 46);
    assert_eq!(duration.hours(), "0:46");
    Ok(())
}

#[test]
fn offset_tag_subtracts_prior_work() -> Result<(), DurationError> {
    let current = CommitRecord::new("abc1234", T0 + 100 * 60, "Fix bug [BC:-15]");
    let parsed = directive(&current.message);
    let duration = resolve_duration(parsed.time(), current.timestamp, Some(T0))?;
    assert_eq!(duration.hours(), "1:25");
    Ok(())
}

#[test]
fn fixed_tag_works_on_first_commit() -> Result<(), DurationError> {
    let current = CommitRecord::new("abc1234", T0, "Initial import [BC:45]");
    let parsed = directive(&current.message);
    assert!(!parsed.time().needs_previous_commit());
    let duration = resolve_duration(parsed.time(), current.timestamp, None)?;
    assert_eq!(duration.hours(), "0:45");
    Ok(())
}

#[test]
fn delta_tag_on_first_commit_fails() {
    let current = CommitRecord::new("abc1234", T0, "Initial import [BC]");
    let parsed = directive(&current.message);
    assert_eq!(
        resolve_duration(parsed.time(), current.timestamp, None),
        Err(DurationError::NoPreviousCommit)
    );
}

#[test]
fn filter_tag_selects_single_task() -> Result<(), SelectionError> {
    let parsed = directive("Widget polish [BC:T foo bar]");
    let none = select_task(
        parsed.filter_terms(),
        vec![CandidateTask::new(1, "Foo thing"), CandidateTask::new(2, "Bar thing")],
    );
    assert_eq!(none, Err(SelectionError::NoMatch));

    let one = select_task(
        parsed.filter_terms(),
        vec![CandidateTask::new(1, "Foo thing"), CandidateTask::new(9, "Foo Bar widget")],
    )?;
    assert_eq!(one.task().id, 9);
    Ok(())
}

#[test]
fn empty_filter_with_completion_flag_never_selects() {
    let parsed = directive("Done [BC:TX]");
    assert!(parsed.auto_complete());
    assert_eq!(
        select_task(parsed.filter_terms(), vec![CandidateTask::new(1, "Anything")]),
        Err(SelectionError::NoMatch)
    );
}

#[test]
fn entry_uses_stripped_message() -> Result<(), DurationError> {
    let current = CommitRecord::new("f00dcafe", T0, "Fix bug [BC:30m]");
    let parsed = directive(&current.message);
    let duration = resolve_duration(parsed.time(), current.timestamp, None)?;
    let entry = TimeEntry::new(5, date!(2010 - 09 - 06), duration, parsed.message(), &current.short_hash);
    assert_eq!(entry.description, "Fix bug (f00dcafe)");
    assert_eq!(entry.hours, "0:30");
    Ok(())
}
