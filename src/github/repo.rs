//! Github payloads and their conversion to the platform independent entities
use serde::{Deserialize, Serialize};

use crate::{
    entities::{ExistingItem, NewIssue, NewMilestone},
    utils::{DestinationHandle, NormalizedState},
};

/// Github repository owner
#[derive(Deserialize, Serialize, Default, Debug, Clone)]
pub struct OwnerGithub {
    /// Login of the owner
    pub login: String,
}

/// Github Repo
#[derive(Deserialize, Serialize, Default, Debug, Clone)]
pub struct RepoGithub {
    /// Repository name
    pub name: String,

    /// Repository owner
    pub owner: OwnerGithub,

    /// Repository https clone URL
    pub clone_url: String,

    /// Repository URL
    pub html_url: String,
}

impl From<RepoGithub> for DestinationHandle {
    fn from(repo: RepoGithub) -> Self {
        DestinationHandle {
            owner: repo.owner.login,
            name: repo.name,
            clone_url: repo.clone_url,
            html_url: repo.html_url,
        }
    }
}

/// Github label
#[derive(Deserialize, Default, Debug, Clone)]
pub struct LabelGithub {
    /// Label name
    pub name: String,
}

/// Github milestone
#[derive(Deserialize, Default, Debug, Clone)]
pub struct MilestoneGithub {
    /// Milestone number
    pub number: u64,

    /// Milestone title
    pub title: String,
}

/// Github milestone creation body
#[derive(Serialize, Debug, Clone)]
pub struct MilestoneCreation {
    /// Milestone title
    pub title: String,

    /// Milestone description
    pub description: String,

    /// Milestone state
    pub state: &'static str,
}

impl From<NewMilestone> for MilestoneCreation {
    fn from(milestone: NewMilestone) -> Self {
        MilestoneCreation {
            title: milestone.title,
            description: milestone.description,
            state: milestone.state.as_str(),
        }
    }
}

/// Github issue or pull request, as listed
#[derive(Deserialize, Default, Debug, Clone)]
pub struct IssueGithub {
    /// Issue title
    pub title: String,

    /// Issue state (open, closed)
    pub state: String,

    /// Present when the issue is a pull request
    pub pull_request: Option<serde_json::Value>,
}

impl From<IssueGithub> for ExistingItem {
    fn from(issue: IssueGithub) -> Self {
        ExistingItem {
            title: issue.title,
            state: NormalizedState::from_source(&issue.state),
        }
    }
}

/// Github issue creation body
#[derive(Serialize, Debug, Clone)]
pub struct IssueCreation {
    /// Issue title
    pub title: String,

    /// Issue body
    pub body: String,

    /// Label names
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,

    /// Milestone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<u64>,
}

impl From<NewIssue> for IssueCreation {
    fn from(issue: NewIssue) -> Self {
        IssueCreation {
            title: issue.title,
            body: issue.body,
            labels: issue.labels,
            milestone: issue.milestone,
        }
    }
}

/// Github created issue, pull request or milestone
#[derive(Deserialize, Default, Debug, Clone)]
pub struct CreatedGithub {
    /// Number of the created item
    pub number: u64,
}

/// Github branch
#[derive(Deserialize, Default, Debug, Clone)]
pub struct BranchGithub {
    /// Branch name
    pub name: String,
}
