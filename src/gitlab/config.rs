//! Gitlab configuration
use serde::{Deserialize, Serialize};

use super::platform::GitlabPlatform;
use crate::config::MigrationConfig;

/// Gitlab section of the configuration file
#[derive(Deserialize, Serialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct GitlabConfig {
    /// Gitlab instance URL
    pub url: Option<String>,

    /// Gitlab token
    pub token: Option<String>,

    /// Id (or full path) of the group to migrate
    pub group_id: Option<String>,
}

impl GitlabConfig {
    /// Get the Gitlab platform for a resolved configuration
    pub fn get_platform(config: &MigrationConfig) -> GitlabPlatform {
        GitlabPlatform::new(
            config.gitlab_url.clone(),
            config.gitlab_token.clone(),
            config.gitlab_group_id.clone(),
        )
    }
}
