//! Gitlab platform, the source of the migration
use log::debug;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use urlencoding::encode;

use super::{
    types::{GitlabIssue, GitlabLabel, GitlabMergeRequest, GitlabMilestone, GitlabNote, GitlabProject},
    GITLAB_API_PATH, GITLAB_TOKEN_HEADER, GITLAB_TRANSPORT_USER, PER_PAGE,
};
use crate::{
    entities::{SourceIssue, SourceLabel, SourceMilestone, SourceRequest},
    errors::{MigratorError, MigratorErrorKind},
    platform::{PlatformFuture, PlatformType, SourcePlatform},
    utils::{embed_credentials, RepositoryDescriptor},
};

/// Gitlab platform
#[derive(Default, Debug, Clone)]
pub struct GitlabPlatform {
    /// Gitlab instance URL
    url: String,

    /// Gitlab token
    token: String,

    /// Group to migrate
    group_id: String,

    /// Reqwest client
    client: reqwest::Client,
}

impl GitlabPlatform {
    /// Create a new GitlabPlatform
    pub(crate) fn new(url: String, token: String, group_id: String) -> Self {
        Self {
            url,
            token,
            group_id,
            client: reqwest::Client::new(),
        }
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
        let url = format!("{}{}{}", self.url, GITLAB_API_PATH, path);
        let mut page: usize = 1;
        let mut all_items = vec![];
        loop {
            let page_str = page.to_string();
            let per_page = PER_PAGE.to_string();
            let response = self
                .client
                .get(&url)
                .header(GITLAB_TOKEN_HEADER, &self.token)
                .header(ACCEPT, "application/json")
                .query(&[("per_page", per_page.as_str()), ("page", page_str.as_str())])
                .query(query)
                .send()
                .await?;
            let status = response.status();
            if !status.is_success() {
                let text = response.text().await?;
                return Err(MigratorError::new(MigratorErrorKind::SourceUnavailable)
                    .with_platform(PlatformType::Gitlab)
                    .with_status(status)
                    .with_text(&format!("GET {path}: {text}")));
            }
            let text = response.text().await?;
            let items: Vec<T> = serde_json::from_str(&text)?;
            let count = items.len();
            debug!("Requested gitlab {path} (page {page}): {count}");
            all_items.extend(items);
            if count < PER_PAGE {
                return Ok(all_items);
            }
            page += 1;
        }
    }

    /// Note bodies of an issue or a merge request, oldest first
    async fn get_notes(&self, path: String) -> Result<Vec<String>, MigratorError> {
        let notes: Vec<GitlabNote> = self
            .get_all_pages(&path, &[("order_by", "created_at"), ("sort", "asc")])
            .await?;
        Ok(notes.into_iter().filter_map(|n| n.body).collect())
    }
}

impl SourcePlatform for GitlabPlatform {
    fn get_type(&self) -> PlatformType {
        PlatformType::Gitlab
    }

    fn list_projects(&self) -> PlatformFuture<'_, Vec<RepositoryDescriptor>> {
        Box::pin(async move {
            let path = format!("/groups/{}/projects", encode(&self.group_id));
            let projects: Vec<GitlabProject> = self.get_all_pages(&path, &[]).await?;
            Ok(projects.into_iter().map(|p| p.into()).collect())
        })
    }

    fn list_labels(&self, project_id: u64) -> PlatformFuture<'_, Vec<SourceLabel>> {
        Box::pin(async move {
            let path = format!("/projects/{project_id}/labels");
            let labels: Vec<GitlabLabel> = self.get_all_pages(&path, &[]).await?;
            Ok(labels.into_iter().map(|l| l.into()).collect())
        })
    }

    fn list_milestones(&self, project_id: u64) -> PlatformFuture<'_, Vec<SourceMilestone>> {
        Box::pin(async move {
            let path = format!("/projects/{project_id}/milestones");
            let milestones: Vec<GitlabMilestone> = self.get_all_pages(&path, &[]).await?;
            Ok(milestones.into_iter().map(|m| m.into()).collect())
        })
    }

    fn list_issues(&self, project_id: u64) -> PlatformFuture<'_, Vec<SourceIssue>> {
        Box::pin(async move {
            let path = format!("/projects/{project_id}/issues");
            let issues: Vec<GitlabIssue> = self
                .get_all_pages(&path, &[("scope", "all"), ("state", "all")])
                .await?;
            Ok(issues.into_iter().map(|i| i.into()).collect())
        })
    }

    fn list_issue_notes(&self, project_id: u64, iid: u64) -> PlatformFuture<'_, Vec<String>> {
        Box::pin(self.get_notes(format!("/projects/{project_id}/issues/{iid}/notes")))
    }

    fn list_requests(&self, project_id: u64) -> PlatformFuture<'_, Vec<SourceRequest>> {
        Box::pin(async move {
            let path = format!("/projects/{project_id}/merge_requests");
            let requests: Vec<GitlabMergeRequest> =
                self.get_all_pages(&path, &[("state", "all")]).await?;
            Ok(requests.into_iter().map(|r| r.into()).collect())
        })
    }

    fn list_request_notes(&self, project_id: u64, iid: u64) -> PlatformFuture<'_, Vec<String>> {
        Box::pin(self.get_notes(format!(
            "/projects/{project_id}/merge_requests/{iid}/notes"
        )))
    }

    fn authenticated_url(&self, repo: &RepositoryDescriptor) -> Result<String, MigratorError> {
        embed_credentials(&repo.http_url, GITLAB_TRANSPORT_USER, &self.token)
    }
}
