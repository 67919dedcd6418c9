//! Creation of the destination repository
use log::{info, warn};

use crate::{
    config::MigrationConfig,
    errors::{MigratorError, MigratorErrorKind},
    platform::DestinationPlatform,
    utils::{sanitize_description, DestinationHandle, NewRepository, RepositoryDescriptor, Visibility},
};

/// Repository creation request for a source repository
pub fn new_repository(repo: &RepositoryDescriptor, force_private: bool) -> NewRepository {
    let visibility = Visibility::resolve(&repo.visibility, force_private);
    NewRepository {
        name: repo.name.clone(),
        description: sanitize_description(repo.description.as_deref()),
        private: visibility == Visibility::Private,
        auto_init: false,
    }
}

/// Make sure the destination repository exists.
///
/// An existing repository is returned as is, its settings are never changed.
/// # Errors
/// `ProvisionError` if the repository can't be looked up or created
pub async fn ensure_repository(
    destination: &dyn DestinationPlatform,
    repo: &RepositoryDescriptor,
    config: &MigrationConfig,
) -> Result<DestinationHandle, MigratorError> {
    let provision_error = |e: MigratorError| {
        MigratorError::new(MigratorErrorKind::Provision)
            .with_platform(destination.get_type())
            .with_text(&format!("Repository {}", repo.name))
            .with_source(e)
    };
    if let Some(existing) = destination
        .get_repo(&repo.name)
        .await
        .map_err(provision_error)?
    {
        warn!(
            "Repository {} already exists on {}, its history will be overwritten",
            repo.name,
            destination.get_type()
        );
        return Ok(existing);
    }
    let request = new_repository(repo, config.force_private);
    let private = request.private;
    let handle = destination
        .create_repo(request)
        .await
        .map_err(provision_error)?;
    info!(
        "Created repository {}/{} (visibility: {})",
        handle.owner,
        handle.name,
        if private {
            Visibility::Private
        } else {
            Visibility::Public
        }
    );
    Ok(handle)
}
