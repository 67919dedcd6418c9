//! Discovery of the source repositories
use log::{error, info};

use crate::{
    errors::{MigratorError, MigratorErrorKind},
    platform::SourcePlatform,
    utils::RepositoryDescriptor,
};

/// Finds the repositories of the source group
pub struct Resolver<'a> {
    /// Source platform
    source: &'a dyn SourcePlatform,
}

impl<'a> Resolver<'a> {
    /// Create a resolver over a source platform
    pub fn new(source: &'a dyn SourcePlatform) -> Self {
        Self { source }
    }

    /// Every repository of the group
    /// # Errors
    /// `SourceUnavailable` if the group can't be listed
    pub async fn list_repositories(&self) -> Result<Vec<RepositoryDescriptor>, MigratorError> {
        match self.source.list_projects().await {
            Ok(repositories) => {
                info!(
                    "Found {} repositories on {}",
                    repositories.len(),
                    self.source.get_type()
                );
                Ok(repositories)
            }
            Err(e) => {
                error!("Unable to list the {} repositories: {e}", self.source.get_type());
                Err(MigratorError::new(MigratorErrorKind::SourceUnavailable)
                    .with_platform(self.source.get_type())
                    .with_source(e))
            }
        }
    }

    /// The repository of the group with this exact name
    /// # Errors
    /// `SourceUnavailable` if the group can't be listed, `NotFound` if no repository matches
    pub async fn find_repository(&self, name: &str) -> Result<RepositoryDescriptor, MigratorError> {
        let repositories = self.list_repositories().await?;
        match repositories.into_iter().find(|repo| repo.name == name) {
            Some(repo) => {
                info!("Found repository {}", repo.show_full_name());
                Ok(repo)
            }
            None => {
                error!("Repository {name} not found");
                Err(MigratorError::new(MigratorErrorKind::NotFound)
                    .with_platform(self.source.get_type())
                    .with_text(&format!("Repository {name} not found")))
            }
        }
    }
}
