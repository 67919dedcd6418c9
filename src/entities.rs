//! Platform independent entities exchanged between the platforms and the migrators
use serde::Serialize;

use crate::utils::NormalizedState;

/// Label read from the source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLabel {
    /// Label name
    pub name: String,

    /// Color, with or without a leading `#`
    pub color: Option<String>,

    /// Label description
    pub description: Option<String>,
}

/// Milestone read from the source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMilestone {
    /// Milestone id on the source
    pub id: u64,

    /// Milestone title
    pub title: String,

    /// Milestone description
    pub description: Option<String>,

    /// Source state (active, closed)
    pub state: String,
}

/// Issue read from the source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceIssue {
    /// Project scoped issue number
    pub iid: u64,

    /// Issue title
    pub title: String,

    /// Issue body
    pub description: Option<String>,

    /// Source state (opened, closed)
    pub state: String,

    /// Label names
    pub labels: Vec<String>,

    /// Source milestone id
    pub milestone_id: Option<u64>,
}

/// Merge request read from the source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRequest {
    /// Project scoped request number
    pub iid: u64,

    /// Request title
    pub title: String,

    /// Request body
    pub description: Option<String>,

    /// Source state (opened, closed, merged, locked)
    pub state: String,

    /// Branch the changes come from
    pub source_branch: String,

    /// Branch the changes go to
    pub target_branch: String,

    /// Label names
    pub labels: Vec<String>,

    /// Source milestone id
    pub milestone_id: Option<u64>,

    /// Author display name
    pub author: Option<String>,

    /// Web URL of the request
    pub web_url: String,
}

/// Label to create on the destination
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct NewLabel {
    /// Label name
    pub name: String,

    /// Bare hex color
    pub color: String,

    /// Label description
    pub description: String,
}

/// Milestone to create on the destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMilestone {
    /// Milestone title
    pub title: String,

    /// Milestone description
    pub description: String,

    /// Milestone state
    pub state: NormalizedState,
}

/// Issue to create on the destination
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewIssue {
    /// Issue title
    pub title: String,

    /// Issue body
    pub body: String,

    /// Label names, all present on the destination
    pub labels: Vec<String>,

    /// Destination milestone number
    pub milestone: Option<u64>,
}

/// Pull request to open on the destination
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct NewPull {
    /// Pull request title
    pub title: String,

    /// Pull request body
    pub body: String,

    /// Branch the changes come from
    pub head: String,

    /// Branch the changes go to
    pub base: String,
}

/// Issue or pull request already on the destination
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExistingItem {
    /// Title
    pub title: String,

    /// State
    pub state: NormalizedState,
}
