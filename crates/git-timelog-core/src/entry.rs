use std::fmt;

use time::Date;

use crate::duration::ResolvedDuration;

/// Where a time entry is filed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Project-level time entries.
    Project(u64),
    /// Time entries of a single task.
    Task(u64),
}

impl TargetKind {
    /// Service path (without extension) of the time-entry collection.
    #[must_use]
    pub fn time_entries_path(self) -> String {
        match self {
            Self::Project(id) => format!("projects/{id}/time_entries"),
            Self::Task(id) => format!("todo_items/{id}/time_entries"),
        }
    }

    /// Task id for task targets.
    #[must_use]
    pub const fn task_id(self) -> Option<u64> {
        match self {
            Self::Task(id) => Some(id),
            Self::Project(_) => None,
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Project(id) => write!(f, "project #{id}"),
            Self::Task(id) => write!(f, "task #{id}"),
        }
    }
}

/// Time-entry payload, built once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeEntry {
    /// Person the time is logged for.
    pub person_id: u64,
    /// Day of work.
    pub date: Date,
    /// `H:MM` duration.
    pub hours: String,
    /// Commit message plus short hash, markup-escaped.
    pub description: String,
}

impl TimeEntry {
    /// Build an entry describing `message` as committed in `short_hash`.
    #[must_use]
    pub fn new(
        person_id: u64,
        date: Date,
        duration: ResolvedDuration,
        message: &str,
        short_hash: &str,
    ) -> Self {
        Self {
            person_id,
            date,
            hours: duration.hours(),
            description: escape_markup(&format!("{} ({short_hash})", message.trim())),
        }
    }

    /// `YYYY-MM-DD` form of [`Self::date`].
    #[must_use]
    pub fn date_iso(&self) -> String {
        format!(
            "{:04}-{:02}-{:02}",
            self.date.year(),
            u8::from(self.date.month()),
            self.date.day()
        )
    }

    /// Compact XML document accepted by the time-entry endpoints.
    #[must_use]
    pub fn to_xml(&self) -> String {
        format!(
            "<time-entry><person-id>{}</person-id><date>{}</date><hours>{}</hours><description>{}</description></time-entry>",
            self.person_id,
            self.date_iso(),
            self.hours,
            self.description
        )
    }
}

/// Escape `&`, `<` and `>` for embedding in an XML text node.
#[must_use]
pub fn escape_markup(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn description_carries_message_and_hash() {
        let entry = TimeEntry::new(
            42,
            date!(2024 - 03 - 05),
            ResolvedDuration::from_minutes(85),
            "  Fix <b> & co  ",
            "abc1234",
        );
        assert_eq!(entry.hours, "1:25");
        assert_eq!(entry.description, "Fix &lt;b&gt; &amp; co (abc1234)");
        assert_eq!(entry.date_iso(), "2024-03-05");
    }

    #[test]
    fn xml_payload_is_compact() {
        let entry = TimeEntry::new(
            7,
            date!(2010 - 09 - 06),
            ResolvedDuration::from_minutes(45),
            "Docs",
            "deadbee",
        );
        assert_eq!(
            entry.to_xml(),
            "<time-entry><person-id>7</person-id><date>2010-09-06</date><hours>0:45</hours><description>Docs (deadbee)</description></time-entry>"
        );
    }

    #[test]
    fn escaping_handles_ampersand_first() {
        assert_eq!(escape_markup("a&lt;"), "a&amp;lt;");
        assert_eq!(escape_markup("plain"), "plain");
    }

    #[test]
    fn targets_map_to_collections() {
        assert_eq!(TargetKind::Project(9).time_entries_path(), "projects/9/time_entries");
        assert_eq!(TargetKind::Task(3).time_entries_path(), "todo_items/3/time_entries");
        assert_eq!(TargetKind::Task(3).task_id(), Some(3));
        assert_eq!(TargetKind::Project(9).task_id(), None);
    }
}
