//! Gitlab API payloads and their conversion to the platform independent entities
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    entities::{SourceIssue, SourceLabel, SourceMilestone, SourceRequest},
    utils::RepositoryDescriptor,
};

/// Gitlab project
#[derive(Deserialize, Serialize, Default, Debug, Clone)]
pub struct GitlabProject {
    /// Project id
    pub id: u64,

    /// Project name
    pub name: String,

    /// Project path
    pub path: String,

    /// Project description
    pub description: Option<String>,

    /// Project visibility
    pub visibility: String,

    /// Web URL
    pub web_url: String,

    /// SSH clone URL
    pub ssh_url_to_repo: String,

    /// HTTP clone URL
    pub http_url_to_repo: String,
}

impl From<GitlabProject> for RepositoryDescriptor {
    fn from(project: GitlabProject) -> Self {
        RepositoryDescriptor {
            id: project.id,
            name: project.name,
            path: project.path,
            description: project.description,
            visibility: project.visibility,
            web_url: project.web_url,
            ssh_url: project.ssh_url_to_repo,
            http_url: project.http_url_to_repo,
        }
    }
}

/// Gitlab label
#[derive(Deserialize, Default, Debug, Clone)]
pub struct GitlabLabel {
    /// Label name
    pub name: String,

    /// Label color (`#RRGGBB`)
    pub color: Option<String>,

    /// Label description
    pub description: Option<String>,
}

impl From<GitlabLabel> for SourceLabel {
    fn from(label: GitlabLabel) -> Self {
        SourceLabel {
            name: label.name,
            color: label.color,
            description: label.description,
        }
    }
}

/// Gitlab milestone
#[derive(Deserialize, Default, Debug, Clone)]
pub struct GitlabMilestone {
    /// Milestone id
    pub id: u64,

    /// Milestone title
    pub title: String,

    /// Milestone description
    pub description: Option<String>,

    /// Milestone state (active, closed)
    pub state: String,
}

impl From<GitlabMilestone> for SourceMilestone {
    fn from(milestone: GitlabMilestone) -> Self {
        SourceMilestone {
            id: milestone.id,
            title: milestone.title,
            description: milestone.description,
            state: milestone.state,
        }
    }
}

/// Reference to a milestone from an issue or a merge request
#[derive(Deserialize, Default, Debug, Clone)]
pub struct GitlabMilestoneRef {
    /// Milestone id
    pub id: u64,
}

/// Gitlab user
#[derive(Deserialize, Default, Debug, Clone)]
pub struct GitlabUser {
    /// Display name
    pub name: Option<String>,

    /// Username
    pub username: Option<String>,
}

/// Gitlab issue
#[derive(Deserialize, Default, Debug, Clone)]
pub struct GitlabIssue {
    /// Project scoped number
    pub iid: u64,

    /// Issue title
    pub title: String,

    /// Issue body
    pub description: Option<String>,

    /// Issue state (opened, closed)
    pub state: String,

    /// Label names
    #[serde(default, deserialize_with = "label_names")]
    pub labels: Vec<String>,

    /// Milestone
    pub milestone: Option<GitlabMilestoneRef>,
}

impl From<GitlabIssue> for SourceIssue {
    fn from(issue: GitlabIssue) -> Self {
        SourceIssue {
            iid: issue.iid,
            title: issue.title,
            description: issue.description,
            state: issue.state,
            labels: issue.labels,
            milestone_id: issue.milestone.map(|m| m.id),
        }
    }
}

/// Gitlab merge request
#[derive(Deserialize, Default, Debug, Clone)]
pub struct GitlabMergeRequest {
    /// Project scoped number
    pub iid: u64,

    /// Merge request title
    pub title: String,

    /// Merge request body
    pub description: Option<String>,

    /// Merge request state (opened, closed, merged, locked)
    pub state: String,

    /// Branch the changes come from
    pub source_branch: String,

    /// Branch the changes go to
    pub target_branch: String,

    /// Label names
    #[serde(default, deserialize_with = "label_names")]
    pub labels: Vec<String>,

    /// Milestone
    pub milestone: Option<GitlabMilestoneRef>,

    /// Author
    pub author: Option<GitlabUser>,

    /// Web URL
    #[serde(default)]
    pub web_url: String,
}

impl From<GitlabMergeRequest> for SourceRequest {
    fn from(mr: GitlabMergeRequest) -> Self {
        SourceRequest {
            iid: mr.iid,
            title: mr.title,
            description: mr.description,
            state: mr.state,
            source_branch: mr.source_branch,
            target_branch: mr.target_branch,
            labels: mr.labels,
            milestone_id: mr.milestone.map(|m| m.id),
            author: mr.author.and_then(|a| a.name.or(a.username)),
            web_url: mr.web_url,
        }
    }
}

/// Gitlab note (comment)
#[derive(Deserialize, Default, Debug, Clone)]
pub struct GitlabNote {
    /// Note body
    pub body: Option<String>,
}

/// Label as returned by Gitlab: a bare name, or an object when label details are requested
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum GitlabLabelRef {
    /// Bare name
    Name(String),
    /// Detailed label
    Detailed {
        /// Label name
        name: String,
    },
    /// Anything else, dropped
    Other(serde_json::Value),
}

/// Normalize every label representation to its name
fn label_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let labels = Option::<Vec<GitlabLabelRef>>::deserialize(deserializer)?;
    Ok(labels
        .unwrap_or_default()
        .into_iter()
        .filter_map(|label| match label {
            GitlabLabelRef::Name(name) => Some(name),
            GitlabLabelRef::Detailed { name } => Some(name),
            GitlabLabelRef::Other(_) => None,
        })
        .collect())
}
