//! Platform abstractions for the source and destination of a migration
use std::{fmt, future::Future, pin::Pin};

use serde::Deserialize;

use crate::{
    entities::{
        ExistingItem, NewIssue, NewLabel, NewMilestone, NewPull, SourceIssue, SourceLabel,
        SourceMilestone, SourceRequest,
    },
    errors::MigratorError,
    utils::{DestinationHandle, NewRepository, RepositoryDescriptor},
};

/// Boxed future returned by every platform call
pub type PlatformFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, MigratorError>> + Send + 'a>>;

/// Platform projects are read from
pub trait SourcePlatform: Sync + Send {
    /// List every project of the configured group
    fn list_projects(&self) -> PlatformFuture<'_, Vec<RepositoryDescriptor>>;

    /// List the labels of a project
    fn list_labels(&self, project_id: u64) -> PlatformFuture<'_, Vec<SourceLabel>>;

    /// List the milestones of a project
    fn list_milestones(&self, project_id: u64) -> PlatformFuture<'_, Vec<SourceMilestone>>;

    /// List the issues of a project
    fn list_issues(&self, project_id: u64) -> PlatformFuture<'_, Vec<SourceIssue>>;

    /// List the note bodies of an issue, in listing order
    fn list_issue_notes(&self, project_id: u64, iid: u64) -> PlatformFuture<'_, Vec<String>>;

    /// List the merge requests of a project
    fn list_requests(&self, project_id: u64) -> PlatformFuture<'_, Vec<SourceRequest>>;

    /// List the note bodies of a merge request, in listing order
    fn list_request_notes(&self, project_id: u64, iid: u64) -> PlatformFuture<'_, Vec<String>>;

    /// Clone URL of a project with the credentials embedded
    /// # Errors
    /// Error if the project URL can't be parsed
    fn authenticated_url(&self, repo: &RepositoryDescriptor) -> Result<String, MigratorError>;

    /// Type of the platform
    fn get_type(&self) -> PlatformType;
}

/// Platform projects are written to
pub trait DestinationPlatform: Sync + Send {
    /// Get a repository of the organization, `None` if it doesn't exist
    fn get_repo<'a>(&'a self, name: &'a str) -> PlatformFuture<'a, Option<DestinationHandle>>;

    /// Create a repository in the organization
    fn create_repo(&self, repo: NewRepository) -> PlatformFuture<'_, DestinationHandle>;

    /// List the label names of a repository
    fn list_labels<'a>(&'a self, repo: &'a DestinationHandle) -> PlatformFuture<'a, Vec<String>>;

    /// Create a label
    fn create_label<'a>(
        &'a self,
        repo: &'a DestinationHandle,
        label: NewLabel,
    ) -> PlatformFuture<'a, ()>;

    /// List the milestones of a repository as `(title, number)`
    fn list_milestones<'a>(
        &'a self,
        repo: &'a DestinationHandle,
    ) -> PlatformFuture<'a, Vec<(String, u64)>>;

    /// Create a milestone, returns its number
    fn create_milestone<'a>(
        &'a self,
        repo: &'a DestinationHandle,
        milestone: NewMilestone,
    ) -> PlatformFuture<'a, u64>;

    /// List the issues of a repository in every state, pull requests excluded
    fn list_issues<'a>(
        &'a self,
        repo: &'a DestinationHandle,
    ) -> PlatformFuture<'a, Vec<ExistingItem>>;

    /// Create an issue, returns its number
    fn create_issue<'a>(
        &'a self,
        repo: &'a DestinationHandle,
        issue: NewIssue,
    ) -> PlatformFuture<'a, u64>;

    /// Comment on an issue or a pull request
    fn create_comment<'a>(
        &'a self,
        repo: &'a DestinationHandle,
        number: u64,
        body: String,
    ) -> PlatformFuture<'a, ()>;

    /// Close an issue
    fn close_issue<'a>(&'a self, repo: &'a DestinationHandle, number: u64)
        -> PlatformFuture<'a, ()>;

    /// List the branch names of a repository
    fn list_branches<'a>(&'a self, repo: &'a DestinationHandle)
        -> PlatformFuture<'a, Vec<String>>;

    /// List the pull requests of a repository in every state
    fn list_pulls<'a>(&'a self, repo: &'a DestinationHandle)
        -> PlatformFuture<'a, Vec<ExistingItem>>;

    /// Open a pull request, returns its number
    fn create_pull<'a>(
        &'a self,
        repo: &'a DestinationHandle,
        pull: NewPull,
    ) -> PlatformFuture<'a, u64>;

    /// Add labels to an issue or a pull request
    fn add_labels<'a>(
        &'a self,
        repo: &'a DestinationHandle,
        number: u64,
        labels: Vec<String>,
    ) -> PlatformFuture<'a, ()>;

    /// Set the milestone of an issue or a pull request
    fn set_milestone<'a>(
        &'a self,
        repo: &'a DestinationHandle,
        number: u64,
        milestone: u64,
    ) -> PlatformFuture<'a, ()>;

    /// Close a pull request
    fn close_pull<'a>(&'a self, repo: &'a DestinationHandle, number: u64)
        -> PlatformFuture<'a, ()>;

    /// Push URL of a repository with the credentials embedded
    /// # Errors
    /// Error if the repository URL can't be parsed
    fn authenticated_url(&self, repo: &DestinationHandle) -> Result<String, MigratorError>;

    /// Type of the platform
    fn get_type(&self) -> PlatformType;
}

/// Supported platforms
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum PlatformType {
    /// GitLab, the source
    Gitlab,
    /// GitHub, the destination
    Github,
}

impl fmt::Display for PlatformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformType::Gitlab => write!(f, "gitlab"),
            PlatformType::Github => write!(f, "github"),
        }
    }
}
