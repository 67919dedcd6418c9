//! Github Platform, the destination of the migration
use log::debug;
use reqwest::{
    header::{ACCEPT, AUTHORIZATION, USER_AGENT},
    Method, RequestBuilder, StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use urlencoding::encode;

use super::{
    repo::{
        BranchGithub, CreatedGithub, IssueCreation, IssueGithub, LabelGithub, MilestoneCreation,
        MilestoneGithub, RepoGithub,
    },
    GITHUB_API_HEADER, GITHUB_API_URL, GITHUB_API_VERSION, GITHUB_TRANSPORT_USER, PER_PAGE,
};
use crate::{
    entities::{ExistingItem, NewIssue, NewLabel, NewMilestone, NewPull},
    errors::{MigratorError, MigratorErrorKind},
    platform::{DestinationPlatform, PlatformFuture, PlatformType},
    utils::{embed_credentials, DestinationHandle, NewRepository},
};

/// Github Platform
#[derive(Default, Debug, Clone)]
pub struct GithubPlatform {
    /// Organization receiving the repositories
    org: String,

    /// Github token
    token: String,

    /// Reqwest client
    client: reqwest::Client,
}

impl GithubPlatform {
    /// Create a new GithubPlatform
    pub(crate) fn new(org: String, token: String) -> Self {
        Self {
            org,
            token,
            client: reqwest::Client::new(),
        }
    }

    /// Request to the API with the Github headers
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("https://{GITHUB_API_URL}{path}"))
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .header(GITHUB_API_HEADER, GITHUB_API_VERSION)
    }

    /// Send a request, fail with `kind` on an unsuccessful status
    async fn send(
        &self,
        request: RequestBuilder,
        kind: MigratorErrorKind,
    ) -> Result<String, MigratorError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(MigratorError::new(kind)
                .with_platform(PlatformType::Github)
                .with_status(status)
                .with_text(&text));
        }
        Ok(text)
    }

    /// Send a request and decode its response
    async fn send_json<T>(
        &self,
        request: RequestBuilder,
        kind: MigratorErrorKind,
    ) -> Result<T, MigratorError>
    where
        T: DeserializeOwned,
    {
        let text = self.send(request, kind).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Fetch every page of a collection
    async fn get_all_pages<T>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, MigratorError>
    where
        T: DeserializeOwned,
    {
        let mut page: usize = 1;
        let mut all_items = vec![];
        loop {
            let page_str = page.to_string();
            let per_page = PER_PAGE.to_string();
            let request = self
                .request(Method::GET, path)
                .query(&[("per_page", per_page.as_str()), ("page", page_str.as_str())])
                .query(query);
            let items: Vec<T> = self
                .send_json(request, MigratorErrorKind::EntityMigration)
                .await?;
            let count = items.len();
            debug!("Requested github {path} (page {page}): {count}");
            all_items.extend(items);
            if count < PER_PAGE {
                return Ok(all_items);
            }
            page += 1;
        }
    }
}

/// Path of a repository endpoint
fn repo_path(repo: &DestinationHandle, rest: &str) -> String {
    format!("/repos/{}/{}{}", encode(&repo.owner), encode(&repo.name), rest)
}

impl DestinationPlatform for GithubPlatform {
    fn get_type(&self) -> PlatformType {
        PlatformType::Github
    }

    fn get_repo<'a>(&'a self, name: &'a str) -> PlatformFuture<'a, Option<DestinationHandle>> {
        Box::pin(async move {
            let path = format!("/repos/{}/{}", encode(&self.org), encode(name));
            let response = self.request(Method::GET, &path).send().await?;
            let status = response.status();
            if status == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            let text = response.text().await?;
            if !status.is_success() {
                return Err(MigratorError::new(MigratorErrorKind::Provision)
                    .with_platform(PlatformType::Github)
                    .with_status(status)
                    .with_text(&text));
            }
            let repo: RepoGithub = serde_json::from_str(&text)?;
            Ok(Some(repo.into()))
        })
    }

    fn create_repo(&self, repo: NewRepository) -> PlatformFuture<'_, DestinationHandle> {
        Box::pin(async move {
            let path = format!("/orgs/{}/repos", encode(&self.org));
            let request = self.request(Method::POST, &path).json(&repo);
            let created: RepoGithub = self
                .send_json(request, MigratorErrorKind::Provision)
                .await?;
            Ok(created.into())
        })
    }

    fn list_labels<'a>(&'a self, repo: &'a DestinationHandle) -> PlatformFuture<'a, Vec<String>> {
        Box::pin(async move {
            let labels: Vec<LabelGithub> = self
                .get_all_pages(&repo_path(repo, "/labels"), &[])
                .await?;
            Ok(labels.into_iter().map(|l| l.name).collect())
        })
    }

    fn create_label<'a>(
        &'a self,
        repo: &'a DestinationHandle,
        label: NewLabel,
    ) -> PlatformFuture<'a, ()> {
        Box::pin(async move {
            let request = self
                .request(Method::POST, &repo_path(repo, "/labels"))
                .json(&label);
            self.send(request, MigratorErrorKind::EntityMigration)
                .await
                .map(|_| ())
        })
    }

    fn list_milestones<'a>(
        &'a self,
        repo: &'a DestinationHandle,
    ) -> PlatformFuture<'a, Vec<(String, u64)>> {
        Box::pin(async move {
            let milestones: Vec<MilestoneGithub> = self
                .get_all_pages(&repo_path(repo, "/milestones"), &[("state", "all")])
                .await?;
            Ok(milestones.into_iter().map(|m| (m.title, m.number)).collect())
        })
    }

    fn create_milestone<'a>(
        &'a self,
        repo: &'a DestinationHandle,
        milestone: NewMilestone,
    ) -> PlatformFuture<'a, u64> {
        Box::pin(async move {
            let request = self
                .request(Method::POST, &repo_path(repo, "/milestones"))
                .json(&MilestoneCreation::from(milestone));
            let created: CreatedGithub = self
                .send_json(request, MigratorErrorKind::EntityMigration)
                .await?;
            Ok(created.number)
        })
    }

    fn list_issues<'a>(
        &'a self,
        repo: &'a DestinationHandle,
    ) -> PlatformFuture<'a, Vec<ExistingItem>> {
        Box::pin(async move {
            let issues: Vec<IssueGithub> = self
                .get_all_pages(&repo_path(repo, "/issues"), &[("state", "all")])
                .await?;
            Ok(issues
                .into_iter()
                .filter(|i| i.pull_request.is_none())
                .map(|i| i.into())
                .collect())
        })
    }

    fn create_issue<'a>(
        &'a self,
        repo: &'a DestinationHandle,
        issue: NewIssue,
    ) -> PlatformFuture<'a, u64> {
        Box::pin(async move {
            let request = self
                .request(Method::POST, &repo_path(repo, "/issues"))
                .json(&IssueCreation::from(issue));
            let created: CreatedGithub = self
                .send_json(request, MigratorErrorKind::EntityMigration)
                .await?;
            Ok(created.number)
        })
    }

    fn create_comment<'a>(
        &'a self,
        repo: &'a DestinationHandle,
        number: u64,
        body: String,
    ) -> PlatformFuture<'a, ()> {
        Box::pin(async move {
            let request = self
                .request(
                    Method::POST,
                    &repo_path(repo, &format!("/issues/{number}/comments")),
                )
                .json(&json!({ "body": body }));
            self.send(request, MigratorErrorKind::EntityMigration)
                .await
                .map(|_| ())
        })
    }

    fn close_issue<'a>(
        &'a self,
        repo: &'a DestinationHandle,
        number: u64,
    ) -> PlatformFuture<'a, ()> {
        Box::pin(async move {
            let request = self
                .request(Method::PATCH, &repo_path(repo, &format!("/issues/{number}")))
                .json(&json!({ "state": "closed" }));
            self.send(request, MigratorErrorKind::EntityMigration)
                .await
                .map(|_| ())
        })
    }

    fn list_branches<'a>(
        &'a self,
        repo: &'a DestinationHandle,
    ) -> PlatformFuture<'a, Vec<String>> {
        Box::pin(async move {
            let branches: Vec<BranchGithub> = self
                .get_all_pages(&repo_path(repo, "/branches"), &[])
                .await?;
            Ok(branches.into_iter().map(|b| b.name).collect())
        })
    }

    fn list_pulls<'a>(
        &'a self,
        repo: &'a DestinationHandle,
    ) -> PlatformFuture<'a, Vec<ExistingItem>> {
        Box::pin(async move {
            let pulls: Vec<IssueGithub> = self
                .get_all_pages(&repo_path(repo, "/pulls"), &[("state", "all")])
                .await?;
            Ok(pulls.into_iter().map(|p| p.into()).collect())
        })
    }

    fn create_pull<'a>(
        &'a self,
        repo: &'a DestinationHandle,
        pull: NewPull,
    ) -> PlatformFuture<'a, u64> {
        Box::pin(async move {
            let request = self
                .request(Method::POST, &repo_path(repo, "/pulls"))
                .json(&pull);
            let created: CreatedGithub = self
                .send_json(request, MigratorErrorKind::EntityMigration)
                .await?;
            Ok(created.number)
        })
    }

    fn add_labels<'a>(
        &'a self,
        repo: &'a DestinationHandle,
        number: u64,
        labels: Vec<String>,
    ) -> PlatformFuture<'a, ()> {
        Box::pin(async move {
            let request = self
                .request(
                    Method::POST,
                    &repo_path(repo, &format!("/issues/{number}/labels")),
                )
                .json(&json!({ "labels": labels }));
            self.send(request, MigratorErrorKind::EntityMigration)
                .await
                .map(|_| ())
        })
    }

    fn set_milestone<'a>(
        &'a self,
        repo: &'a DestinationHandle,
        number: u64,
        milestone: u64,
    ) -> PlatformFuture<'a, ()> {
        Box::pin(async move {
            let request = self
                .request(Method::PATCH, &repo_path(repo, &format!("/issues/{number}")))
                .json(&json!({ "milestone": milestone }));
            self.send(request, MigratorErrorKind::EntityMigration)
                .await
                .map(|_| ())
        })
    }

    fn close_pull<'a>(
        &'a self,
        repo: &'a DestinationHandle,
        number: u64,
    ) -> PlatformFuture<'a, ()> {
        Box::pin(async move {
            let request = self
                .request(Method::PATCH, &repo_path(repo, &format!("/pulls/{number}")))
                .json(&json!({ "state": "closed" }));
            self.send(request, MigratorErrorKind::EntityMigration)
                .await
                .map(|_| ())
        })
    }

    fn authenticated_url(&self, repo: &DestinationHandle) -> Result<String, MigratorError> {
        embed_credentials(&repo.clone_url, GITHUB_TRANSPORT_USER, &self.token)
    }
}
