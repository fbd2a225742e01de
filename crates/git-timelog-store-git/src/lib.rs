//! Git-backed access to the commit log and configuration for git-timelog.

use std::fs;
use std::path::{Path, PathBuf};

use git_timelog_core::CommitRecord;
use git2::{Config, ConfigLevel, ErrorCode, Oid, Repository, Sort};
use tracing::{debug, info};

mod error;

pub use error::{GitStoreError, Result};

const POST_COMMIT_HOOK: &str = "post-commit";

/// Which Git configuration a key is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// The user's global configuration (`git config --global`).
    Global,
    /// The repository view: local configuration layered over global and system.
    Local,
}

/// Result of installing the post-commit hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookInstall {
    /// The hook script was written.
    Written(PathBuf),
    /// A hook already exists and was left untouched.
    AlreadyPresent(PathBuf),
}

/// Repository handle used by the hook.
pub struct GitLog {
    repo: Repository,
    global_config: Option<PathBuf>,
}

impl GitLog {
    /// Discover and open the repository from `cwd_or_repo`.
    ///
    /// # Errors
    /// Returns an error if a Git repository cannot be discovered from the given path.
    pub fn open(cwd_or_repo: impl AsRef<Path>) -> Result<Self> {
        let repo = Repository::discover(cwd_or_repo)?;
        Ok(Self::from_repository(repo))
    }

    /// Wrap an already opened repository.
    #[must_use]
    pub const fn from_repository(repo: Repository) -> Self {
        Self {
            repo,
            global_config: None,
        }
    }

    /// Use `path` instead of the user's global Git configuration file.
    #[must_use]
    pub fn with_global_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_config = Some(path.into());
        self
    }

    /// Working tree root, or the Git directory for bare repositories.
    #[must_use]
    pub fn workdir(&self) -> &Path {
        self.repo.workdir().unwrap_or_else(|| self.repo.path())
    }

    /// Snapshot of the commit `skip` positions back from `HEAD`.
    ///
    /// Commits are visited newest first, as `git log` lists them. Returns
    /// `None` when history is shorter than `skip + 1` commits.
    ///
    /// # Errors
    /// Returns an error if the history cannot be walked.
    pub fn commit(&self, skip: usize) -> Result<Option<CommitRecord>> {
        let mut walk = self.repo.revwalk()?;
        walk.set_sorting(Sort::TIME)?;
        match walk.push_head() {
            Ok(()) => {}
            Err(err) if matches!(err.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                debug!("HEAD is unborn; no commits to read");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        }

        let Some(oid) = walk.nth(skip).transpose()? else {
            debug!(skip, "history is shorter than requested");
            return Ok(None);
        };
        let commit = self.repo.find_commit(oid)?;
        let short_id = commit.as_object().short_id()?;
        let short_hash = short_id
            .as_str()
            .map_or_else(|| oid.to_string(), str::to_owned);
        let message = String::from_utf8_lossy(commit.message_bytes())
            .trim_end_matches(['\n', '\r'])
            .to_owned();

        Ok(Some(CommitRecord {
            short_hash,
            timestamp: commit.time().seconds(),
            message,
        }))
    }

    /// Rewrite the message of the `HEAD` commit, keeping tree and signatures.
    ///
    /// # Errors
    /// Returns [`GitStoreError::UnbornHead`] when there is no commit, or a Git
    /// error when the amended commit cannot be written.
    pub fn amend_head_message(&self, message: &str) -> Result<Oid> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(err) if matches!(err.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                return Err(GitStoreError::UnbornHead);
            }
            Err(err) => return Err(err.into()),
        };
        let commit = head.peel_to_commit()?;
        let mut body = message.to_owned();
        if !body.ends_with('\n') {
            body.push('\n');
        }
        let oid = commit.amend(Some("HEAD"), None, None, None, Some(&body), None)?;
        info!(%oid, previous = %commit.id(), "Amended HEAD message");
        Ok(oid)
    }

    /// Read a configuration value; blank values count as missing.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be opened or parsed.
    pub fn config_value(&self, key: &str, scope: Scope) -> Result<Option<String>> {
        let config = match scope {
            Scope::Local => Some(self.repo.config()?),
            Scope::Global => self.global()?,
        };
        let Some(config) = config else {
            return Ok(None);
        };
        match config.get_string(key) {
            Ok(value) if value.trim().is_empty() => Ok(None),
            Ok(value) => Ok(Some(value.trim().to_owned())),
            Err(err) if err.code() == ErrorCode::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Store a value in the global configuration, replacing any previous one.
    ///
    /// # Errors
    /// Returns an error if no global configuration file can be located or
    /// written.
    pub fn set_global_value(&self, key: &str, value: &str) -> Result<()> {
        let path = match &self.global_config {
            Some(path) => path.clone(),
            None => Config::find_global()?,
        };
        let mut config = Config::open(&path)?;
        config.set_str(key, value)?;
        debug!(key, path = %path.display(), "Stored global config value");
        Ok(())
    }

    /// Write an executable `post-commit` hook running `command`.
    ///
    /// An existing hook is only replaced when `force` is set.
    ///
    /// # Errors
    /// Returns an error if the hooks directory or script cannot be written.
    pub fn install_post_commit_hook(&self, command: &str, force: bool) -> Result<HookInstall> {
        let hooks_dir = self.repo.path().join("hooks");
        let hook_path = hooks_dir.join(POST_COMMIT_HOOK);
        if hook_path.exists() && !force {
            return Ok(HookInstall::AlreadyPresent(hook_path));
        }

        fs::create_dir_all(&hooks_dir)?;
        fs::write(&hook_path, format!("#!/bin/sh\nexec {command}\n"))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&hook_path)?.permissions();
            perms.set_mode(0o755);
            fs::set_permissions(&hook_path, perms)?;
        }

        info!(path = %hook_path.display(), "Installed post-commit hook");
        Ok(HookInstall::Written(hook_path))
    }

    fn global(&self) -> Result<Option<Config>> {
        if let Some(path) = &self.global_config {
            if !path.exists() {
                return Ok(None);
            }
            return Ok(Some(Config::open(path)?));
        }
        match Config::open_default()?.open_level(ConfigLevel::Global) {
            Ok(config) => Ok(Some(config)),
            Err(err) if err.code() == ErrorCode::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}
