use std::{fmt, fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::RunError;
use crate::repository::{ConfigStore, Scope};

const CONFIG_DIR: &str = ".git-timelog";
const CONFIG_FILE: &str = "config.toml";

/// Global Git config key holding the account URL.
pub const API_ENDPOINT_KEY: &str = "basecamp.api-endpoint";
/// Global Git config key holding the API token.
pub const API_TOKEN_KEY: &str = "basecamp.api-token";
/// Global Git config key caching the person id of the token owner.
pub const PERSON_ID_KEY: &str = "basecamp.person-id";
/// Local Git config key naming the project to log against.
pub const PROJECT_ID_KEY: &str = "basecamp.project-id";
/// Local Git config key naming the task currently worked on.
pub const CURRENT_TASK_ID_KEY: &str = "basecamp.current-task-id";

/// Top-level project configuration loaded from `.git-timelog/config.toml`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProjectConfig {
    /// Hook behavior switches.
    #[serde(default)]
    pub options: HookOptions,
}

impl ProjectConfig {
    /// Load configuration from a known working tree directory.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_workdir(workdir: impl AsRef<Path>) -> Result<Self> {
        let config_path = workdir.as_ref().join(CONFIG_DIR).join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;
        Ok(config)
    }
}

/// Behavior switches of the hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HookOptions {
    /// Store the looked-up person id in the global Git config.
    pub cache_person_id: bool,
    /// Amend the commit to drop the tag once time is logged.
    pub strip_tag: bool,
}

impl Default for HookOptions {
    fn default() -> Self {
        Self {
            cache_person_id: true,
            strip_tag: true,
        }
    }
}

/// Credentials and identifiers read from Git config.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    /// Account URL, e.g. `https://acme.basecamphq.com`.
    pub api_endpoint: String,
    /// API token used as the Basic auth user name.
    pub api_token: String,
    /// Cached id of the token owner.
    pub person_id: Option<u64>,
    /// Project receiving time entries.
    pub project_id: u64,
    /// Task to log against when the tag names none.
    pub current_task_id: Option<u64>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_endpoint", &self.api_endpoint)
            .field("api_token", &"<redacted>")
            .field("person_id", &self.person_id)
            .field("project_id", &self.project_id)
            .field("current_task_id", &self.current_task_id)
            .finish()
    }
}

impl Settings {
    /// Read every setting, failing on the first missing required one.
    ///
    /// # Errors
    /// Returns the `Missing*` error of the first absent required key, or
    /// [`RunError::InvalidSetting`] for a non-numeric project id.
    pub fn load<C: ConfigStore>(store: &C) -> Result<Self, RunError> {
        let read = |key: &'static str, scope: Scope| {
            store
                .config_value(key, scope)
                .map_err(|err| RunError::Git(err.into()))
        };

        let api_endpoint = read(API_ENDPOINT_KEY, Scope::Global)?.ok_or(RunError::MissingApiEndpoint)?;
        let api_token = read(API_TOKEN_KEY, Scope::Global)?.ok_or(RunError::MissingApiToken)?;
        // A stale or garbled cache only costs a lookup.
        let person_id = read(PERSON_ID_KEY, Scope::Global)?.and_then(|raw| positive_id(&raw));
        let raw_project = read(PROJECT_ID_KEY, Scope::Local)?.ok_or(RunError::MissingProjectId)?;
        let project_id = positive_id(&raw_project).ok_or(RunError::InvalidSetting {
            key: PROJECT_ID_KEY,
            value: raw_project,
        })?;
        let current_task_id = read(CURRENT_TASK_ID_KEY, Scope::Local)?.and_then(|raw| positive_id(&raw));

        Ok(Self {
            api_endpoint,
            api_token,
            person_id,
            project_id,
            current_task_id,
        })
    }
}

fn positive_id(raw: &str) -> Option<u64> {
    raw.trim().parse().ok().filter(|id| *id > 0)
}
