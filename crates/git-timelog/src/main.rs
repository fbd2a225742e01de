//! CLI entry point for git-timelog.

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

use console::Console;
use git_timelog_app::{ProjectConfig, TimeLogger, today};
use git_timelog_store_git::GitLog;

mod commands;
mod console;

/// Logs tagged commits as Basecamp time entries.
#[derive(Parser, Debug)]
#[command(
    name = "git-timelog",
    version,
    about = "git-timelog: post-commit hook turning [BC...] commit tags into Basecamp time entries"
)]
struct Cli {
    /// Path to repo or any subdir (defaults to current).
    #[arg(long)]
    repo: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log the latest commit, as the post-commit hook does.
    Run {
        /// Resolve everything locally and print what would be logged.
        #[arg(long)]
        dry_run: bool,
    },

    /// Show how a commit message tag is understood.
    Parse {
        /// Full commit message.
        message: String,
    },

    /// Install the post-commit hook into the repository.
    Install {
        /// Replace an existing post-commit hook.
        #[arg(long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    let Cli { repo, cmd } = Cli::parse();
    install_tracing();

    let console = Console::detect();
    let repo_path = repo.unwrap_or_else(|| ".".to_owned());
    match execute_command(&repo_path, cmd, console) {
        Ok(code) => exit_code(code),
        Err(err) => {
            console.error(&format!("{err:#}"));
            exit_code(git_timelog_app::EXIT_OTHER)
        }
    }
}

fn execute_command(repo_path: &str, command: Command, console: Console) -> Result<i32> {
    match command {
        Command::Parse { message } => {
            commands::parse(&message, console);
            Ok(git_timelog_app::EXIT_OK)
        }
        Command::Install { force } => {
            let log = GitLog::open(repo_path)?;
            commands::install(&log, force, console)
        }
        Command::Run { dry_run } => {
            let log = GitLog::open(repo_path)?;
            let options = ProjectConfig::from_workdir(log.workdir())?.options;
            let logger = TimeLogger::new(&log, options, today());
            if dry_run {
                commands::dry_run(&logger, console)
            } else {
                Ok(commands::run(&logger, console))
            }
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(process_status(code))
}

fn process_status(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}

fn install_tracing() {
    // RUST_LOG widens the filter; hook runs stay quiet by default.
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .compact()
        .try_init();
}
