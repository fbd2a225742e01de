use std::ops::Range;

use crate::directive::TermMatcher;

/// Incomplete task offered by the time-tracking service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateTask {
    /// Service-side task id.
    pub id: u64,
    /// Task title.
    pub title: String,
}

impl CandidateTask {
    /// Build a candidate from its parts.
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }
}

/// Outcome of a successful selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selected {
    task: CandidateTask,
    highlights: Vec<Range<usize>>,
}

impl Selected {
    /// The single matching task.
    #[must_use]
    pub const fn task(&self) -> &CandidateTask {
        &self.task
    }

    /// Sorted, non-overlapping byte ranges of term occurrences in the title.
    #[must_use]
    pub fn highlights(&self) -> &[Range<usize>] {
        &self.highlights
    }

    /// Title split into `(text, is_match)` segments, in order.
    #[must_use]
    pub fn segments(&self) -> Vec<(&str, bool)> {
        let title = self.task.title.as_str();
        let mut out = Vec::new();
        let mut cursor = 0;
        for range in &self.highlights {
            if range.start > cursor {
                out.push((&title[cursor..range.start], false));
            }
            out.push((&title[range.clone()], true));
            cursor = range.end;
        }
        if cursor < title.len() {
            out.push((&title[cursor..], false));
        }
        out
    }
}

/// Why a task could not be picked automatically.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    /// Nothing matched, or there was no filter to narrow the candidates.
    #[error("no incomplete task matches the filter")]
    NoMatch,
    /// More than one task matched; the candidates are kept for display.
    #[error("{} tasks match the filter", .0.len())]
    Ambiguous(Vec<CandidateTask>),
}

/// Narrow `candidates` to the single task whose title contains every term.
///
/// An empty term list never selects anything: without a filter there is
/// nothing to disambiguate with.
///
/// # Errors
/// Returns [`SelectionError::NoMatch`] when no candidate qualifies and
/// [`SelectionError::Ambiguous`] when several do.
pub fn select_task(
    terms: &[TermMatcher],
    candidates: Vec<CandidateTask>,
) -> Result<Selected, SelectionError> {
    if terms.is_empty() {
        return Err(SelectionError::NoMatch);
    }

    let mut matching: Vec<CandidateTask> = candidates
        .into_iter()
        .filter(|candidate| terms.iter().all(|term| term.is_match(&candidate.title)))
        .collect();

    match matching.len() {
        0 => Err(SelectionError::NoMatch),
        1 => {
            let task = matching.remove(0);
            let highlights = highlight_ranges(terms, &task.title);
            Ok(Selected { task, highlights })
        }
        _ => Err(SelectionError::Ambiguous(matching)),
    }
}

fn highlight_ranges(terms: &[TermMatcher], title: &str) -> Vec<Range<usize>> {
    let mut ranges: Vec<Range<usize>> = terms
        .iter()
        .flat_map(|term| term.occurrences(title))
        .collect();
    ranges.sort_by_key(|range| (range.start, range.end));

    let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }
    merged
}
