//! Github configuration
use serde::{Deserialize, Serialize};

use super::platform::GithubPlatform;
use crate::config::MigrationConfig;

/// Github section of the configuration file
#[derive(Deserialize, Serialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct GithubConfig {
    /// Github token
    pub token: Option<String>,

    /// Organization receiving the repositories
    pub org: Option<String>,
}

impl GithubConfig {
    /// Get the github platform for a resolved configuration
    pub fn get_platform(config: &MigrationConfig) -> GithubPlatform {
        GithubPlatform::new(config.github_org.clone(), config.github_token.clone())
    }
}
