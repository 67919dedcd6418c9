//! In memory platforms for the tests
use std::{
    collections::{HashMap, HashSet},
    future::ready,
    sync::{Mutex, MutexGuard},
    time::Duration,
};

use crate::{
    config::MigrationConfig,
    entities::{
        ExistingItem, NewIssue, NewLabel, NewMilestone, NewPull, SourceIssue, SourceLabel,
        SourceMilestone, SourceRequest,
    },
    errors::{MigratorError, MigratorErrorKind},
    migrate::RepositoryContext,
    platform::{DestinationPlatform, PlatformFuture, PlatformType, SourcePlatform},
    transport::{HistoryTransport, MirrorJob},
    utils::{DestinationHandle, NewRepository, NormalizedState, RepositoryDescriptor},
};

/// Already computed platform answer
fn answer<'a, T: Send + 'a>(result: Result<T, MigratorError>) -> PlatformFuture<'a, T> {
    Box::pin(ready(result))
}

/// Error of a refused call
fn refused(what: &str) -> MigratorError {
    MigratorError::new(MigratorErrorKind::Reqwest).with_text(&format!("{what} refused"))
}

/// Source repository with predictable URLs
pub(crate) fn descriptor(id: u64, name: &str) -> RepositoryDescriptor {
    RepositoryDescriptor {
        id,
        name: name.to_string(),
        path: name.to_string(),
        description: None,
        visibility: "public".to_string(),
        web_url: format!("https://gitlab.example.com/group/{name}"),
        ssh_url: format!("git@gitlab.example.com:group/{name}.git"),
        http_url: format!("https://gitlab.example.com/group/{name}.git"),
    }
}

/// Destination repository of the `acme` organization
pub(crate) fn handle(name: &str) -> DestinationHandle {
    DestinationHandle {
        owner: "acme".to_string(),
        name: name.to_string(),
        clone_url: format!("https://github.com/acme/{name}.git"),
        html_url: format!("https://github.com/acme/{name}"),
    }
}

/// Configuration migrating everything without pauses
pub(crate) fn test_config() -> MigrationConfig {
    MigrationConfig {
        gitlab_url: "https://gitlab.example.com".to_string(),
        gitlab_token: "glpat-secret".to_string(),
        gitlab_group_id: "42".to_string(),
        github_token: "ghp-secret".to_string(),
        github_org: "acme".to_string(),
        migrate_issues: true,
        migrate_merge_requests: true,
        migrate_labels: true,
        migrate_milestones: true,
        target_repo: None,
        force_private: false,
        item_delay: Duration::ZERO,
    }
}

/// Context of a repository without pauses
pub(crate) fn context<'a>(
    source: &'a FakeSource,
    destination: &'a FakeDestination,
    repo: &'a DestinationHandle,
) -> RepositoryContext<'a> {
    RepositoryContext {
        source,
        destination,
        project_id: 1,
        repo,
        item_delay: Duration::ZERO,
    }
}

/// Source serving the same content for every project
#[derive(Default)]
pub(crate) struct FakeSource {
    pub projects: Vec<RepositoryDescriptor>,
    pub unavailable: bool,
    pub labels: Vec<SourceLabel>,
    pub milestones: Vec<SourceMilestone>,
    pub issues: Vec<SourceIssue>,
    pub requests: Vec<SourceRequest>,
    /// Issue notes by iid
    pub notes: HashMap<u64, Vec<String>>,
    /// Merge request notes by iid
    pub request_notes: HashMap<u64, Vec<String>>,
}

impl SourcePlatform for FakeSource {
    fn list_projects(&self) -> PlatformFuture<'_, Vec<RepositoryDescriptor>> {
        if self.unavailable {
            return answer(Err(MigratorError::new(MigratorErrorKind::SourceUnavailable)));
        }
        answer(Ok(self.projects.clone()))
    }

    fn list_labels(&self, _project_id: u64) -> PlatformFuture<'_, Vec<SourceLabel>> {
        answer(Ok(self.labels.clone()))
    }

    fn list_milestones(&self, _project_id: u64) -> PlatformFuture<'_, Vec<SourceMilestone>> {
        answer(Ok(self.milestones.clone()))
    }

    fn list_issues(&self, _project_id: u64) -> PlatformFuture<'_, Vec<SourceIssue>> {
        answer(Ok(self.issues.clone()))
    }

    fn list_issue_notes(&self, _project_id: u64, iid: u64) -> PlatformFuture<'_, Vec<String>> {
        answer(Ok(self.notes.get(&iid).cloned().unwrap_or_default()))
    }

    fn list_requests(&self, _project_id: u64) -> PlatformFuture<'_, Vec<SourceRequest>> {
        answer(Ok(self.requests.clone()))
    }

    fn list_request_notes(&self, _project_id: u64, iid: u64) -> PlatformFuture<'_, Vec<String>> {
        answer(Ok(self.request_notes.get(&iid).cloned().unwrap_or_default()))
    }

    fn authenticated_url(&self, repo: &RepositoryDescriptor) -> Result<String, MigratorError> {
        Ok(repo.http_url.clone())
    }

    fn get_type(&self) -> PlatformType {
        PlatformType::Gitlab
    }
}

/// Issue created on the fake destination
#[derive(Debug, Clone)]
pub(crate) struct FakeIssue {
    pub number: u64,
    pub issue: NewIssue,
    pub state: NormalizedState,
}

/// Pull request opened on the fake destination
#[derive(Debug, Clone)]
pub(crate) struct FakePull {
    pub number: u64,
    pub pull: NewPull,
    pub state: NormalizedState,
    pub labels: Vec<String>,
    pub milestone: Option<u64>,
}

/// Everything written to the fake destination
#[derive(Default)]
pub(crate) struct FakeState {
    /// Names of the existing repositories
    pub repos: Vec<String>,
    pub created_repos: Vec<NewRepository>,
    pub fail_repo_creation: bool,
    pub refused_repos: HashSet<String>,
    pub labels: Vec<String>,
    pub refused_labels: HashSet<String>,
    pub created_labels: Vec<NewLabel>,
    /// Existing milestones as `(title, number)`
    pub milestones: Vec<(String, u64)>,
    pub refused_milestones: HashSet<String>,
    pub created_milestones: Vec<(u64, NewMilestone)>,
    pub issues: Vec<FakeIssue>,
    /// Titles of the issues the destination refuses
    pub refused_issues: HashSet<String>,
    /// Comments as `(number, body)`
    pub comments: Vec<(u64, String)>,
    pub branches: Vec<String>,
    pub pulls: Vec<FakePull>,
    /// Titles of the pull requests the destination refuses
    pub refused_pulls: HashSet<String>,
    next_number: u64,
}

impl FakeState {
    /// Number shared by issues, pull requests and milestones
    fn next_number(&mut self) -> u64 {
        self.next_number += 1;
        self.next_number
    }

    /// Add an issue created before the migration
    pub fn existing_issue(&mut self, title: &str, state: NormalizedState) {
        let number = self.next_number();
        self.issues.push(FakeIssue {
            number,
            issue: NewIssue {
                title: title.to_string(),
                ..Default::default()
            },
            state,
        });
    }

    /// Add a pull request opened before the migration
    pub fn existing_pull(&mut self, title: &str, state: NormalizedState) {
        let number = self.next_number();
        self.pulls.push(FakePull {
            number,
            pull: NewPull {
                title: title.to_string(),
                body: String::new(),
                head: "feature".to_string(),
                base: "main".to_string(),
            },
            state,
            labels: vec![],
            milestone: None,
        });
    }
}

/// Destination keeping every write in memory
#[derive(Default)]
pub(crate) struct FakeDestination {
    state: Mutex<FakeState>,
}

impl FakeDestination {
    /// Destination where `name` already exists
    pub fn with_repo(name: &str) -> Self {
        let destination = Self::default();
        destination.state().repos.push(name.to_string());
        destination
    }

    /// Lock the state, never held across an await
    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl DestinationPlatform for FakeDestination {
    fn get_repo<'a>(&'a self, name: &'a str) -> PlatformFuture<'a, Option<DestinationHandle>> {
        let found = self.state().repos.iter().any(|repo| repo == name);
        answer(Ok(found.then(|| handle(name))))
    }

    fn create_repo(&self, repo: NewRepository) -> PlatformFuture<'_, DestinationHandle> {
        let mut state = self.state();
        if state.fail_repo_creation || state.refused_repos.contains(&repo.name) {
            return answer(Err(refused("repository creation")));
        }
        let created = handle(&repo.name);
        state.repos.push(repo.name.clone());
        state.created_repos.push(repo);
        answer(Ok(created))
    }

    fn list_labels<'a>(&'a self, _repo: &'a DestinationHandle) -> PlatformFuture<'a, Vec<String>> {
        answer(Ok(self.state().labels.clone()))
    }

    fn create_label<'a>(
        &'a self,
        _repo: &'a DestinationHandle,
        label: NewLabel,
    ) -> PlatformFuture<'a, ()> {
        let mut state = self.state();
        if state.refused_labels.contains(&label.name) {
            return answer(Err(refused("label creation")));
        }
        state.labels.push(label.name.clone());
        state.created_labels.push(label);
        answer(Ok(()))
    }

    fn list_milestones<'a>(
        &'a self,
        _repo: &'a DestinationHandle,
    ) -> PlatformFuture<'a, Vec<(String, u64)>> {
        answer(Ok(self.state().milestones.clone()))
    }

    fn create_milestone<'a>(
        &'a self,
        _repo: &'a DestinationHandle,
        milestone: NewMilestone,
    ) -> PlatformFuture<'a, u64> {
        let mut state = self.state();
        if state.refused_milestones.contains(&milestone.title) {
            return answer(Err(refused("milestone creation")));
        }
        let number = state.next_number();
        state.milestones.push((milestone.title.clone(), number));
        state.created_milestones.push((number, milestone));
        answer(Ok(number))
    }

    fn list_issues<'a>(
        &'a self,
        _repo: &'a DestinationHandle,
    ) -> PlatformFuture<'a, Vec<ExistingItem>> {
        let items = self
            .state()
            .issues
            .iter()
            .map(|i| ExistingItem {
                title: i.issue.title.clone(),
                state: i.state,
            })
            .collect();
        answer(Ok(items))
    }

    fn create_issue<'a>(
        &'a self,
        _repo: &'a DestinationHandle,
        issue: NewIssue,
    ) -> PlatformFuture<'a, u64> {
        let mut state = self.state();
        if state.refused_issues.contains(&issue.title) {
            return answer(Err(refused("issue creation")));
        }
        let number = state.next_number();
        state.issues.push(FakeIssue {
            number,
            issue,
            state: NormalizedState::Open,
        });
        answer(Ok(number))
    }

    fn create_comment<'a>(
        &'a self,
        _repo: &'a DestinationHandle,
        number: u64,
        body: String,
    ) -> PlatformFuture<'a, ()> {
        self.state().comments.push((number, body));
        answer(Ok(()))
    }

    fn close_issue<'a>(
        &'a self,
        _repo: &'a DestinationHandle,
        number: u64,
    ) -> PlatformFuture<'a, ()> {
        let mut state = self.state();
        match state.issues.iter_mut().find(|i| i.number == number) {
            Some(issue) => {
                issue.state = NormalizedState::Closed;
                answer(Ok(()))
            }
            None => answer(Err(refused("closing an unknown issue"))),
        }
    }

    fn list_branches<'a>(
        &'a self,
        _repo: &'a DestinationHandle,
    ) -> PlatformFuture<'a, Vec<String>> {
        answer(Ok(self.state().branches.clone()))
    }

    fn list_pulls<'a>(
        &'a self,
        _repo: &'a DestinationHandle,
    ) -> PlatformFuture<'a, Vec<ExistingItem>> {
        let items = self
            .state()
            .pulls
            .iter()
            .map(|p| ExistingItem {
                title: p.pull.title.clone(),
                state: p.state,
            })
            .collect();
        answer(Ok(items))
    }

    fn create_pull<'a>(
        &'a self,
        _repo: &'a DestinationHandle,
        pull: NewPull,
    ) -> PlatformFuture<'a, u64> {
        let mut state = self.state();
        if state.refused_pulls.contains(&pull.title) {
            return answer(Err(refused("pull request creation")));
        }
        let number = state.next_number();
        state.pulls.push(FakePull {
            number,
            pull,
            state: NormalizedState::Open,
            labels: vec![],
            milestone: None,
        });
        answer(Ok(number))
    }

    fn add_labels<'a>(
        &'a self,
        _repo: &'a DestinationHandle,
        number: u64,
        labels: Vec<String>,
    ) -> PlatformFuture<'a, ()> {
        let mut state = self.state();
        match state.pulls.iter_mut().find(|p| p.number == number) {
            Some(pull) => {
                pull.labels.extend(labels);
                answer(Ok(()))
            }
            None => answer(Err(refused("labelling an unknown pull request"))),
        }
    }

    fn set_milestone<'a>(
        &'a self,
        _repo: &'a DestinationHandle,
        number: u64,
        milestone: u64,
    ) -> PlatformFuture<'a, ()> {
        let mut state = self.state();
        match state.pulls.iter_mut().find(|p| p.number == number) {
            Some(pull) => {
                pull.milestone = Some(milestone);
                answer(Ok(()))
            }
            None => answer(Err(refused("milestone of an unknown pull request"))),
        }
    }

    fn close_pull<'a>(
        &'a self,
        _repo: &'a DestinationHandle,
        number: u64,
    ) -> PlatformFuture<'a, ()> {
        let mut state = self.state();
        match state.pulls.iter_mut().find(|p| p.number == number) {
            Some(pull) => {
                pull.state = NormalizedState::Closed;
                answer(Ok(()))
            }
            None => answer(Err(refused("closing an unknown pull request"))),
        }
    }

    fn authenticated_url(&self, repo: &DestinationHandle) -> Result<String, MigratorError> {
        Ok(repo.clone_url.clone())
    }

    fn get_type(&self) -> PlatformType {
        PlatformType::Github
    }
}

/// Transport recording the repositories it was asked to mirror
#[derive(Default)]
pub(crate) struct FakeTransport {
    fail: bool,
    jobs: Mutex<Vec<String>>,
}

impl FakeTransport {
    /// Transport failing every job
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// Names of the mirrored repositories
    pub fn jobs(&self) -> Vec<String> {
        match self.jobs.lock() {
            Ok(jobs) => jobs.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl HistoryTransport for FakeTransport {
    fn transport_history(&self, job: MirrorJob) -> PlatformFuture<'_, ()> {
        if let Ok(mut jobs) = self.jobs.lock() {
            jobs.push(job.name);
        }
        if self.fail {
            return answer(Err(MigratorError::new(MigratorErrorKind::Transport)));
        }
        answer(Ok(()))
    }
}
