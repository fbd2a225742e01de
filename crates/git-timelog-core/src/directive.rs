use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

use regex::{Captures, Regex, RegexBuilder};

/// `[BC]`, `[BC:<time>]`, `[BC:<id>:<time>]` and `[BC:T<filter>[X]]` with an
/// optional `:<time>`, anchored to the very end of the message. At most one
/// time part is accepted.
#[allow(clippy::expect_used)]
static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\[BC(?::T(?P<filter>[^\]:]*)(?::(?P<filter_time>-?\d+[hm]?))?|:(?P<id>\d+):(?P<task_time>-?\d+[hm]?)|:(?P<time>-?\d+[hm]?))?\]\z",
    )
    .expect("tag pattern compiles")
});

/// Task context named by a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskSpec {
    /// Explicit task id.
    Id(u64),
    /// Terms that must all occur in the title of the task to log against.
    Filter(Vec<TermMatcher>),
}

/// How the logged duration is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSpec {
    /// Time elapsed since the previous commit, minus `offset_minutes` already
    /// spent before the timer started.
    Delta {
        /// Minutes subtracted from the delta.
        offset_minutes: i64,
    },
    /// Explicit duration; no commit history is consulted.
    Fixed {
        /// Duration in minutes.
        minutes: i64,
    },
}

impl Default for TimeSpec {
    fn default() -> Self {
        Self::Delta { offset_minutes: 0 }
    }
}

impl TimeSpec {
    /// Whether resolving this spec needs the timestamp of the previous commit.
    #[must_use]
    pub const fn needs_previous_commit(self) -> bool {
        matches!(self, Self::Delta { .. })
    }

    /// Offset for delta specs.
    #[must_use]
    pub const fn offset_minutes(self) -> Option<i64> {
        match self {
            Self::Delta { offset_minutes } => Some(offset_minutes),
            Self::Fixed { .. } => None,
        }
    }

    /// Duration for fixed specs.
    #[must_use]
    pub const fn fixed_minutes(self) -> Option<i64> {
        match self {
            Self::Fixed { minutes } => Some(minutes),
            Self::Delta { .. } => None,
        }
    }
}

/// Structured result of a recognized time-logging tag.
///
/// Built once by [`Directive::parse`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    task: Option<TaskSpec>,
    auto_complete: bool,
    time: TimeSpec,
    message: String,
}

impl Directive {
    /// Parse the tag at the end of `message`.
    ///
    /// Returns `None` when the message does not end with a tag; such commits
    /// are not time-logged at all.
    #[must_use]
    pub fn parse(message: &str) -> Option<Self> {
        let caps = TAG_PATTERN.captures(message)?;
        let tag = caps.get(0)?;
        let (task, auto_complete) = parse_task_part(&caps);
        let time = ["filter_time", "task_time", "time"]
            .into_iter()
            .find_map(|group| caps.name(group))
            .map_or_else(TimeSpec::default, |raw| parse_time_part(raw.as_str()));

        Some(Self {
            task,
            auto_complete,
            time,
            message: message[..tag.start()].trim_end().to_owned(),
        })
    }

    /// True when the tag asks to log against a task rather than the project.
    #[must_use]
    pub const fn task_mode(&self) -> bool {
        self.task.is_some()
    }

    /// Task context, if any.
    #[must_use]
    pub const fn task(&self) -> Option<&TaskSpec> {
        self.task.as_ref()
    }

    /// Explicit task id, if the tag carried one.
    #[must_use]
    pub const fn task_id(&self) -> Option<u64> {
        match self.task {
            Some(TaskSpec::Id(id)) => Some(id),
            _ => None,
        }
    }

    /// Filter terms used to find the task. Empty unless the tag carried a filter.
    #[must_use]
    pub fn filter_terms(&self) -> &[TermMatcher] {
        match &self.task {
            Some(TaskSpec::Filter(terms)) => terms,
            _ => &[],
        }
    }

    /// Whether the task should be marked complete once time is logged.
    #[must_use]
    pub const fn auto_complete(&self) -> bool {
        self.auto_complete
    }

    /// Duration source.
    #[must_use]
    pub const fn time(&self) -> TimeSpec {
        self.time
    }

    /// Commit message with the trailing tag removed.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

fn parse_task_part(caps: &Captures<'_>) -> (Option<TaskSpec>, bool) {
    if let Some(id) = caps.name("id") {
        return (Some(task_from_digits(id.as_str())), false);
    }
    let Some(filter) = caps.name("filter") else {
        return (None, false);
    };

    let text = filter.as_str();
    let (text, auto_complete) = text
        .strip_suffix(|c: char| c.eq_ignore_ascii_case(&'x'))
        .map_or((text, false), |rest| (rest, true));
    let text = text.trim();

    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        return (Some(task_from_digits(text)), auto_complete);
    }
    let terms = text.split_whitespace().filter_map(TermMatcher::new).collect();
    (Some(TaskSpec::Filter(terms)), auto_complete)
}

fn task_from_digits(digits: &str) -> TaskSpec {
    match digits.parse::<u64>() {
        Ok(id) if id > 0 => TaskSpec::Id(id),
        _ => TaskSpec::Filter(Vec::new()),
    }
}

fn parse_time_part(raw: &str) -> TimeSpec {
    let minutes = raw.strip_suffix(|c: char| c.eq_ignore_ascii_case(&'h')).map_or_else(
        || parse_number(raw.trim_end_matches(|c: char| c.eq_ignore_ascii_case(&'m'))),
        |hours| parse_number(hours).saturating_mul(60),
    );
    if minutes > 0 {
        TimeSpec::Fixed { minutes }
    } else {
        TimeSpec::Delta {
            offset_minutes: minutes.saturating_neg(),
        }
    }
}

fn parse_number(digits: &str) -> i64 {
    digits.parse().unwrap_or(0)
}

/// Case-insensitive literal matcher for one filter term.
#[derive(Debug, Clone)]
pub struct TermMatcher {
    term: String,
    pattern: Regex,
}

impl TermMatcher {
    /// Compile a term. Returns `None` for blank input.
    #[must_use]
    pub fn new(term: &str) -> Option<Self> {
        let trimmed = term.trim();
        if trimmed.is_empty() {
            return None;
        }
        let pattern = RegexBuilder::new(&regex::escape(trimmed))
            .case_insensitive(true)
            .build()
            .ok()?;
        Some(Self {
            term: trimmed.to_owned(),
            pattern,
        })
    }

    /// The term as written in the tag.
    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Whether `text` contains the term.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Byte ranges of every occurrence of the term in `text`.
    #[must_use]
    pub fn occurrences(&self, text: &str) -> Vec<Range<usize>> {
        self.pattern.find_iter(text).map(|m| m.range()).collect()
    }
}

impl PartialEq for TermMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.term == other.term
    }
}

impl Eq for TermMatcher {}

impl fmt::Display for TermMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(message: &str) -> Directive {
        Directive::parse(message).unwrap_or_else(|| panic!("expected a tag in {message:?}"))
    }

    fn terms(directive: &Directive) -> Vec<&str> {
        directive.filter_terms().iter().map(TermMatcher::term).collect()
    }

    #[test]
    fn messages_without_tag_are_ignored() {
        assert!(Directive::parse("Fix bug").is_none());
        assert!(Directive::parse("").is_none());
        assert!(Directive::parse("[BC] fix bug").is_none());
        assert!(Directive::parse("Fix bug [BC:oops]").is_none());
        assert!(Directive::parse("Fix bug [XY:30]").is_none());
        assert!(Directive::parse("Work [BC:5:10:20]").is_none());
        assert!(Directive::parse("Work [BC:T docs:10:20]").is_none());
    }

    #[test]
    fn trailing_whitespace_after_tag_is_not_tolerated() {
        assert!(Directive::parse("Fix bug [BC] ").is_none());
        assert!(Directive::parse("Fix bug [BC]\n").is_none());
    }

    #[test]
    fn bare_tag_logs_full_delta_against_project() {
        let directive = parse("Fix bug [BC]");
        assert!(!directive.task_mode());
        assert!(!directive.auto_complete());
        assert_eq!(directive.time(), TimeSpec::Delta { offset_minutes: 0 });
        assert_eq!(directive.message(), "Fix bug");
    }

    #[test]
    fn tag_is_case_insensitive() {
        let directive = parse("Fix bug [bc:t widgetx]");
        assert!(directive.task_mode());
        assert!(directive.auto_complete());
        assert_eq!(terms(&directive), vec!["widget"]);
    }

    #[test]
    fn negative_time_is_an_offset() {
        let directive = parse("Refactor [BC:-15]");
        assert_eq!(directive.time(), TimeSpec::Delta { offset_minutes: 15 });
        assert_eq!(directive.time().offset_minutes(), Some(15));
        assert_eq!(directive.time().fixed_minutes(), None);
    }

    #[test]
    fn zero_time_is_a_zero_offset() {
        let directive = parse("Refactor [BC:0]");
        assert_eq!(directive.time(), TimeSpec::Delta { offset_minutes: 0 });
    }

    #[test]
    fn positive_time_is_a_fixed_duration() {
        assert_eq!(parse("Docs [BC:45]").time(), TimeSpec::Fixed { minutes: 45 });
        assert_eq!(parse("Docs [BC:30m]").time(), TimeSpec::Fixed { minutes: 30 });
        assert_eq!(parse("Docs [BC:2h]").time(), TimeSpec::Fixed { minutes: 120 });
        assert_eq!(parse("Docs [BC:2H]").time(), TimeSpec::Fixed { minutes: 120 });
        assert!(!parse("Docs [BC:45]").time().needs_previous_commit());
    }

    #[test]
    fn hour_suffix_applies_before_sign_interpretation() {
        assert_eq!(
            parse("Docs [BC:-1h]").time(),
            TimeSpec::Delta { offset_minutes: 60 }
        );
    }

    #[test]
    fn single_numeric_segment_is_time_not_task() {
        let directive = parse("Docs [BC:45]");
        assert!(!directive.task_mode());
        assert_eq!(directive.task_id(), None);
    }

    #[test]
    fn numeric_task_part_followed_by_time_names_the_task() {
        let directive = parse("Docs [BC:1234:-10]");
        assert!(directive.task_mode());
        assert_eq!(directive.task_id(), Some(1234));
        assert_eq!(directive.time(), TimeSpec::Delta { offset_minutes: 10 });
        assert!(directive.filter_terms().is_empty());
    }

    #[test]
    fn numeric_text_after_t_names_the_task() {
        let directive = parse("Docs [BC:T987X]");
        assert_eq!(directive.task_id(), Some(987));
        assert!(directive.auto_complete());
        assert!(directive.filter_terms().is_empty());
    }

    #[test]
    fn filter_words_become_terms() {
        let directive = parse("Widget work [BC:T foo bar:1h]");
        assert!(directive.task_mode());
        assert_eq!(directive.task_id(), None);
        assert!(!directive.auto_complete());
        assert_eq!(terms(&directive), vec!["foo", "bar"]);
        assert_eq!(directive.time(), TimeSpec::Fixed { minutes: 60 });
    }

    #[test]
    fn bare_t_enters_task_mode_without_terms() {
        let directive = parse("Widget work [BC:T]");
        assert!(directive.task_mode());
        assert!(directive.filter_terms().is_empty());
        assert!(!directive.auto_complete());

        let directive = parse("Widget work [BC:TX]");
        assert!(directive.task_mode());
        assert!(directive.filter_terms().is_empty());
        assert!(directive.auto_complete());
    }

    #[test]
    fn filter_terms_are_literal_patterns() {
        let directive = parse("Widget work [BC:T c++ (beta)]");
        let matchers = directive.filter_terms();
        assert_eq!(terms(&directive), vec!["c++", "(beta)"]);
        assert!(matchers[0].is_match("Port to C++ runtime"));
        assert!(!matchers[0].is_match("Port to C runtime"));
        assert!(matchers[1].is_match("Ship (BETA) build"));
    }

    #[test]
    fn overflowing_numbers_parse_as_zero() {
        let directive = parse("Docs [BC:99999999999999999999999]");
        assert_eq!(directive.time(), TimeSpec::Delta { offset_minutes: 0 });
    }

    #[test]
    fn stripping_removes_only_the_trailing_tag() {
        assert_eq!(parse("Fix bug [BC:30m]").message(), "Fix bug");
        assert_eq!(
            parse("Fix [core] bug\n\n  details kept [BC]").message(),
            "Fix [core] bug\n\n  details kept"
        );
        assert_eq!(parse("[BC]").message(), "");
    }

    #[test]
    fn parsing_is_repeatable() {
        let message = "Widget work [BC:T foo barX:-20]";
        assert_eq!(parse(message), parse(message));
    }

    #[test]
    fn term_matcher_reports_occurrences() {
        let Some(matcher) = TermMatcher::new("bar") else {
            panic!("matcher must exist for non-blank terms");
        };
        assert_eq!(matcher.occurrences("Bar and bar"), vec![0..3, 8..11]);
        assert!(TermMatcher::new("  ").is_none());
    }
}
