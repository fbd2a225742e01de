use anyhow::Result;
use git_timelog_app::{
    CommitLog, ConfigStore, EXIT_OK, Outcome, Plan, Report, RunError, TaskTarget, TimeLogger,
    bullet_list,
};
use git_timelog_basecamp::BasecampClient;
use git_timelog_core::{Directive, TargetKind, TaskSpec, TimeSpec};
use git_timelog_store_git::{GitLog, HookInstall};

use crate::console::Console;

const HOOK_COMMAND: &str = "git-timelog run";

/// Hook body: log the latest commit and report the outcome.
pub fn run<R>(logger: &TimeLogger<'_, R>, console: Console) -> i32
where
    R: CommitLog + ConfigStore,
{
    let outcome = logger.run(|settings| {
        Ok(BasecampClient::new(
            &settings.api_endpoint,
            &settings.api_token,
        ))
    });
    match outcome {
        Ok(Outcome::Skipped) => EXIT_OK,
        Ok(Outcome::Logged(report)) => {
            print_report(&report, console);
            Outcome::Logged(report).exit_code()
        }
        Err(err) => {
            print_failure(&err, console);
            err.exit_code()
        }
    }
}

/// Resolve everything that needs no network and describe it.
pub fn dry_run<R>(logger: &TimeLogger<'_, R>, console: Console) -> Result<i32>
where
    R: CommitLog + ConfigStore,
{
    match logger.prepare() {
        Ok(None) => {
            console.info("Latest commit carries no time tag; nothing to log.");
            Ok(EXIT_OK)
        }
        Ok(Some(plan)) => {
            for line in describe_plan(&plan) {
                console.info(&line);
            }
            Ok(EXIT_OK)
        }
        Err(err) => {
            print_failure(&err, console);
            Ok(err.exit_code())
        }
    }
}

/// Print the directive found in `message`.
pub fn parse(message: &str, console: Console) {
    match Directive::parse(message) {
        Some(directive) => {
            for line in describe_directive(&directive) {
                console.info(&line);
            }
        }
        None => console.info("no tag"),
    }
}

/// Write the post-commit hook.
pub fn install(log: &GitLog, force: bool, console: Console) -> Result<i32> {
    match log.install_post_commit_hook(HOOK_COMMAND, force)? {
        HookInstall::Written(path) => {
            console.confirm(&format!("Installed {}", path.display()));
            Ok(EXIT_OK)
        }
        HookInstall::AlreadyPresent(path) => {
            console.error(&format!(
                "{} already exists; rerun with --force to replace it",
                path.display()
            ));
            Ok(git_timelog_app::EXIT_OTHER)
        }
    }
}

fn print_report(report: &Report, console: Console) {
    console.info(&summary_line(report));
    if let Some(selected) = &report.selected {
        console.info(&format!(
            "-> Auto-detected single matching task: {} (#{})",
            console.highlighted_title(selected),
            selected.task().id
        ));
    }
    match report.target {
        TargetKind::Project(_) => console.confirm("Time logged!"),
        TargetKind::Task(_) => console.confirm("Time logged to task!"),
    }
    match &report.completion {
        Some(Ok(())) => console.confirm("Task marked as completed!"),
        Some(Err(errors)) => console.error(&bullet_list(errors)),
        None => {}
    }
}

fn summary_line(report: &Report) -> String {
    format!("Logged {}h of work.", report.duration)
}

fn print_failure(err: &RunError, console: Console) {
    match err {
        RunError::AmbiguousTask(candidates) => {
            console.error(&format!("-> {err}"));
            for task in candidates {
                console.error(&console.candidate_line(task));
            }
        }
        other => console.error(&other.to_string()),
    }
}

fn describe_plan(plan: &Plan) -> Vec<String> {
    let target = match plan.task {
        TaskTarget::Project => format!("project #{}", plan.settings.project_id),
        TaskTarget::Known(id) => format!("task #{id}"),
        TaskTarget::Select => format!(
            "the single incomplete task matching {}",
            filter_text(plan.directive.filter_terms().iter().map(ToString::to_string))
        ),
    };
    let mut lines = vec![format!(
        "Would log {}h of work to {target} for commit {}",
        plan.duration, plan.commit.short_hash
    )];
    if plan.directive.auto_complete() && plan.task != TaskTarget::Project {
        lines.push("The task would then be marked as completed.".to_owned());
    }
    lines.push(format!("Description: {}", plan.directive.message().trim()));
    lines
}

fn describe_directive(directive: &Directive) -> Vec<String> {
    let task = match directive.task() {
        None => "none (project)".to_owned(),
        Some(TaskSpec::Id(id)) => format!("#{id}"),
        Some(TaskSpec::Filter(terms)) => {
            format!("filter {}", filter_text(terms.iter().map(ToString::to_string)))
        }
    };
    let time = match directive.time() {
        TimeSpec::Delta { offset_minutes: 0 } => "since previous commit".to_owned(),
        TimeSpec::Delta { offset_minutes } => {
            format!("since previous commit, minus {offset_minutes} minutes")
        }
        TimeSpec::Fixed { minutes } => format!("{minutes} minutes"),
    };
    vec![
        format!("task: {task}"),
        format!("auto-complete: {}", if directive.auto_complete() { "yes" } else { "no" }),
        format!("time: {time}"),
        format!("message: {}", directive.message()),
    ]
}

fn filter_text(terms: impl Iterator<Item = String>) -> String {
    let joined = terms.collect::<Vec<_>>().join(" ");
    if joined.is_empty() {
        "(empty filter)".to_owned()
    } else {
        format!("\"{joined}\"")
    }
}
