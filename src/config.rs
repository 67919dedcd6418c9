//! Configuration handling
//!
//! Values come from an optional TOML file, then from the environment (a `.env`
//! file is loaded first), then from the command line. The result is resolved
//! once into an immutable [`MigrationConfig`].
use std::{fmt, fs::read_to_string, path::PathBuf, time::Duration};

use home::home_dir;
use serde::{Deserialize, Serialize};

use crate::{
    cli::GitlabToGithubCli,
    errors::{MigratorError, MigratorErrorKind},
    github::config::GithubConfig,
    gitlab::config::GitlabConfig,
};

/// Default pause after each migrated issue or merge request
pub const DEFAULT_ITEM_DELAY: Duration = Duration::from_millis(100);

/// Migration section of the configuration file
#[derive(Deserialize, Serialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct MigrationToggles {
    /// Migrate issues
    pub issues: Option<bool>,

    /// Migrate merge requests
    pub merge_requests: Option<bool>,

    /// Migrate labels
    pub labels: Option<bool>,

    /// Migrate milestones
    pub milestones: Option<bool>,

    /// Create every repository as private
    pub force_private: Option<bool>,

    /// Pause after each issue or merge request, in milliseconds
    pub item_delay_ms: Option<u64>,
}

/// Raw configuration data, every field optional
#[derive(Deserialize, Serialize, Default, Clone, Debug, PartialEq, Eq)]
pub struct ConfigData {
    /// Gitlab configuration
    pub gitlab: Option<GitlabConfig>,

    /// Github configuration
    pub github: Option<GithubConfig>,

    /// Migration toggles
    pub migration: Option<MigrationToggles>,
}

impl ConfigData {
    /// Read the configuration file.
    /// An explicit path must exist, the default path is optional.
    /// # Errors
    /// Error if the file can't be read or parsed
    pub fn load(path: Option<&str>) -> Result<Self, MigratorError> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => match Self::default_path() {
                Some(p) if p.exists() => p,
                _ => return Ok(Self::default()),
            },
        };
        let contents = read_to_string(&config_path).map_err(|e| {
            MigratorError::new(MigratorErrorKind::Configuration)
                .with_text(&format!("Unable to open {}", config_path.display()))
                .with_source(e)
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Default path of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        match home_dir() {
            Some(path) if !path.as_os_str().is_empty() => Some(
                path.join(".config")
                    .join(".gitlab2github")
                    .join("config.toml"),
            ),
            _ => None,
        }
    }

    /// Override values with the environment, empty values are ignored
    pub fn merge_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let flag = |name: &str| var(name).map(|v| v.trim().eq_ignore_ascii_case("true"));

        let gitlab = self.gitlab.get_or_insert_with(Default::default);
        if let Some(v) = var("GITLAB_URL") {
            gitlab.url = Some(v);
        }
        if let Some(v) = var("GITLAB_TOKEN") {
            gitlab.token = Some(v);
        }
        if let Some(v) = var("GITLAB_GROUP_ID") {
            gitlab.group_id = Some(v);
        }

        let github = self.github.get_or_insert_with(Default::default);
        if let Some(v) = var("GITHUB_TOKEN") {
            github.token = Some(v);
        }
        if let Some(v) = var("GITHUB_ORG") {
            github.org = Some(v);
        }

        let migration = self.migration.get_or_insert_with(Default::default);
        if let Some(v) = flag("MIGRATE_ISSUES") {
            migration.issues = Some(v);
        }
        if let Some(v) = flag("MIGRATE_MERGE_REQUESTS") {
            migration.merge_requests = Some(v);
        }
        if let Some(v) = flag("MIGRATE_LABELS") {
            migration.labels = Some(v);
        }
        if let Some(v) = flag("MIGRATE_MILESTONES") {
            migration.milestones = Some(v);
        }
        if let Some(v) = flag("FORCE_PRIVATE") {
            migration.force_private = Some(v);
        }
        if let Some(v) = var("MIGRATION_ITEM_DELAY_MS").and_then(|v| v.trim().parse().ok()) {
            migration.item_delay_ms = Some(v);
        }
    }
}

/// Resolved configuration, read-only once built
#[derive(Clone, PartialEq, Eq)]
pub struct MigrationConfig {
    /// Gitlab instance URL
    pub gitlab_url: String,

    /// Gitlab token
    pub gitlab_token: String,

    /// Gitlab group to migrate
    pub gitlab_group_id: String,

    /// Github token
    pub github_token: String,

    /// Github organization receiving the repositories
    pub github_org: String,

    /// Migrate issues
    pub migrate_issues: bool,

    /// Migrate merge requests
    pub migrate_merge_requests: bool,

    /// Migrate labels
    pub migrate_labels: bool,

    /// Migrate milestones
    pub migrate_milestones: bool,

    /// Only migrate this repository
    pub target_repo: Option<String>,

    /// Create every repository as private
    pub force_private: bool,

    /// Pause after each issue or merge request
    pub item_delay: Duration,
}

impl fmt::Debug for MigrationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationConfig")
            .field("gitlab_url", &self.gitlab_url)
            .field("gitlab_group_id", &self.gitlab_group_id)
            .field("github_org", &self.github_org)
            .field("migrate_issues", &self.migrate_issues)
            .field("migrate_merge_requests", &self.migrate_merge_requests)
            .field("migrate_labels", &self.migrate_labels)
            .field("migrate_milestones", &self.migrate_milestones)
            .field("target_repo", &self.target_repo)
            .field("force_private", &self.force_private)
            .field("item_delay", &self.item_delay)
            .finish_non_exhaustive()
    }
}

impl MigrationConfig {
    /// Build the configuration from the file, the environment and the command line
    /// # Errors
    /// Error if the file is invalid or a required value is missing
    pub fn try_new(cli_args: &GitlabToGithubCli) -> Result<Self, MigratorError> {
        dotenv::dotenv().ok();
        let mut data = ConfigData::load(cli_args.config.as_deref())?;
        data.merge_env(|name| std::env::var(name).ok());
        Self::resolve(data, cli_args)
    }

    /// Resolve raw data and command line flags into a configuration
    /// # Errors
    /// Error naming the first required value that is missing
    pub fn resolve(data: ConfigData, cli_args: &GitlabToGithubCli) -> Result<Self, MigratorError> {
        let gitlab = data.gitlab.unwrap_or_default();
        let github = data.github.unwrap_or_default();
        let migration = data.migration.unwrap_or_default();
        Ok(MigrationConfig {
            gitlab_url: required(gitlab.url, "GITLAB_URL")?
                .trim_end_matches('/')
                .to_string(),
            gitlab_token: required(gitlab.token, "GITLAB_TOKEN")?,
            gitlab_group_id: required(gitlab.group_id, "GITLAB_GROUP_ID")?,
            github_token: required(github.token, "GITHUB_TOKEN")?,
            github_org: required(github.org, "GITHUB_ORG")?,
            migrate_issues: migration.issues.unwrap_or(true),
            migrate_merge_requests: migration.merge_requests.unwrap_or(true),
            migrate_labels: migration.labels.unwrap_or(true),
            migrate_milestones: migration.milestones.unwrap_or(true),
            target_repo: cli_args.repo.clone(),
            force_private: cli_args.force_private || migration.force_private.unwrap_or(false),
            item_delay: migration
                .item_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_ITEM_DELAY),
        })
    }
}

/// Value of a required setting
fn required(value: Option<String>, name: &str) -> Result<String, MigratorError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(MigratorError::new(MigratorErrorKind::Configuration).with_text(&format!(
            "Required setting {name} is not set (see env.example to create a .env file)"
        ))),
    }
}
