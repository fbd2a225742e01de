use std::fmt;

use crate::directive::TimeSpec;

const SECONDS_PER_MINUTE: i64 = 60;
const MINUTES_PER_HOUR: u64 = 60;

/// Errors raised while resolving a duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DurationError {
    /// A delta was requested but the current commit is the first one.
    #[error("can't compute a time delta: no previous commit")]
    NoPreviousCommit,
}

/// Whole minutes of work, possibly negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResolvedDuration {
    minutes: i64,
}

impl ResolvedDuration {
    /// Duration of exactly `minutes`.
    #[must_use]
    pub const fn from_minutes(minutes: i64) -> Self {
        Self { minutes }
    }

    /// Convert seconds to minutes, rounding half away from zero.
    ///
    /// 90 seconds is 2 minutes, 89 seconds is 1 minute, -90 seconds is -2.
    #[must_use]
    pub const fn from_seconds(seconds: i64) -> Self {
        let unit = SECONDS_PER_MINUTE.unsigned_abs();
        // |i64::MIN| / 60 always fits back into an i64.
        #[allow(clippy::cast_possible_wrap)]
        let rounded = (seconds.unsigned_abs().saturating_add(unit / 2) / unit) as i64;
        Self {
            minutes: if seconds < 0 { -rounded } else { rounded },
        }
    }

    /// Number of minutes.
    #[must_use]
    pub const fn minutes(self) -> i64 {
        self.minutes
    }

    /// `H:MM` rendering; hours are unpadded and unbounded.
    #[must_use]
    pub fn hours(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ResolvedDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.minutes < 0 { "-" } else { "" };
        let total = self.minutes.unsigned_abs();
        write!(
            f,
            "{sign}{}:{:02}",
            total / MINUTES_PER_HOUR,
            total % MINUTES_PER_HOUR
        )
    }
}

/// Resolve the number of minutes to log.
///
/// Fixed specs ignore the commit timestamps entirely. Delta specs need
/// `previous_timestamp`; negative or zero results are passed through.
///
/// # Errors
/// Returns [`DurationError::NoPreviousCommit`] for a delta spec without a
/// previous commit.
pub fn resolve_duration(
    spec: TimeSpec,
    current_timestamp: i64,
    previous_timestamp: Option<i64>,
) -> Result<ResolvedDuration, DurationError> {
    match spec {
        TimeSpec::Fixed { minutes } => Ok(ResolvedDuration::from_minutes(minutes)),
        TimeSpec::Delta { offset_minutes } => {
            let previous = previous_timestamp.ok_or(DurationError::NoPreviousCommit)?;
            let seconds = current_timestamp
                .saturating_sub(previous)
                .saturating_sub(offset_minutes.saturating_mul(SECONDS_PER_MINUTE));
            Ok(ResolvedDuration::from_seconds(seconds))
        }
    }
}
