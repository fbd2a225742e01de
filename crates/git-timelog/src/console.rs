//! Hook output: plain text when piped, colored when stdout is a terminal.

use std::io::{self, IsTerminal};

use crossterm::style::Stylize;
use git_timelog_core::{CandidateTask, Selected};

/// Writes user-facing messages.
#[derive(Debug, Clone, Copy)]
pub struct Console {
    color: bool,
}

impl Console {
    /// Color output only when stdout is attached to a terminal.
    #[must_use]
    pub fn detect() -> Self {
        Self {
            color: io::stdout().is_terminal(),
        }
    }

    /// Console that never emits escape sequences.
    #[cfg(test)]
    pub const fn plain() -> Self {
        Self { color: false }
    }

    /// Progress message.
    pub fn info(self, message: &str) {
        if self.color {
            println!("{}", message.grey());
        } else {
            println!("{message}");
        }
    }

    /// Success message.
    pub fn confirm(self, message: &str) {
        if self.color {
            println!("{}", message.green());
        } else {
            println!("{message}");
        }
    }

    /// Failure message, on stderr.
    pub fn error(self, message: &str) {
        if self.color {
            eprintln!("{}", message.red());
        } else {
            eprintln!("{message}");
        }
    }

    /// Title of `selected` with the filter matches underlined.
    #[must_use]
    pub fn highlighted_title(self, selected: &Selected) -> String {
        if !self.color {
            return selected.task().title.clone();
        }
        selected
            .segments()
            .into_iter()
            .map(|(text, matched)| {
                if matched {
                    text.green().underlined().to_string()
                } else {
                    text.grey().to_string()
                }
            })
            .collect()
    }

    /// ` - <id> = <title>` listing line for an ambiguous selection.
    #[must_use]
    pub fn candidate_line(self, task: &CandidateTask) -> String {
        let id = format!("{:>10}", task.id);
        if self.color {
            format!(" - {} = {}", id.yellow().bold(), task.title)
        } else {
            format!(" - {id} = {}", task.title)
        }
    }
}
