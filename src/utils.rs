//! Utility functions and shared repository types
use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::{MigratorError, MigratorErrorKind};

/// Source repository as discovered on the source platform
#[derive(Deserialize, Serialize, Debug, Default, PartialEq, Eq, Clone)]
pub struct RepositoryDescriptor {
    /// Project id on the source platform
    pub id: u64,

    /// Name of the repository
    pub name: String,

    /// Path of the repository
    pub path: String,

    /// Description of the repository
    pub description: Option<String>,

    /// Visibility on the source platform (private, internal, public)
    pub visibility: String,

    /// Web URL of the repository
    pub web_url: String,

    /// SSH clone URL
    pub ssh_url: String,

    /// HTTP clone URL
    pub http_url: String,
}

impl RepositoryDescriptor {
    /// Show the full name of the repo, including its path (if different from the name)
    pub fn show_full_name(&self) -> String {
        let fmt_path = if self.name != self.path {
            format!(" at path '{}'", self.path)
        } else {
            "".into()
        };
        format!("{}{}", self.name, fmt_path)
    }
}

/// Repository on the destination platform
#[derive(Deserialize, Serialize, Debug, Default, PartialEq, Eq, Clone)]
pub struct DestinationHandle {
    /// Owner (organization) of the repository
    pub owner: String,

    /// Name of the repository
    pub name: String,

    /// HTTPS clone URL
    pub clone_url: String,

    /// Web URL
    pub html_url: String,
}

/// Visibility of a destination repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Only visible to members
    Private,
    /// Visible to everyone
    Public,
}

impl Visibility {
    /// Destination visibility for a source visibility.
    /// Only `private` stays private, `internal` has no counterpart and becomes public.
    pub fn resolve(source_visibility: &str, force_private: bool) -> Self {
        if force_private || source_visibility == "private" {
            Visibility::Private
        } else {
            Visibility::Public
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Private => write!(f, "private"),
            Visibility::Public => write!(f, "public"),
        }
    }
}

/// Repository creation request
#[derive(Serialize, Debug, PartialEq, Eq, Clone)]
pub struct NewRepository {
    /// Name of the repository
    pub name: String,

    /// Sanitized description
    pub description: String,

    /// Whether the repository is private
    pub private: bool,

    /// Always false: history comes from the mirror push
    pub auto_init: bool,
}

/// Remove the ASCII control characters (0x00-0x1F, 0x7F) that the destination rejects
pub fn sanitize_description(description: Option<&str>) -> String {
    description
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_ascii_control())
        .collect()
}

/// Bare hex color, without the leading `#`
pub fn normalize_color(color: &str) -> String {
    color.strip_prefix('#').unwrap_or(color).to_string()
}

/// Open/closed state shared by both platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NormalizedState {
    /// Anything not closed
    Open,
    /// Closed, or merged for requests
    Closed,
}

impl NormalizedState {
    /// State of a source issue or milestone: only `closed` is closed
    pub fn from_source(state: &str) -> Self {
        match state {
            "closed" => NormalizedState::Closed,
            _ => NormalizedState::Open,
        }
    }

    /// State of a source merge request: `merged` and `closed` are both closed
    pub fn from_request(state: &str) -> Self {
        match state {
            "merged" | "closed" => NormalizedState::Closed,
            _ => NormalizedState::Open,
        }
    }

    /// Wire value on the destination
    pub fn as_str(&self) -> &'static str {
        match self {
            NormalizedState::Open => "open",
            NormalizedState::Closed => "closed",
        }
    }
}

/// Embed credentials in an https clone URL
/// # Errors
/// Error if the URL can't be parsed or can't carry credentials
pub fn embed_credentials(
    raw_url: &str,
    username: &str,
    password: &str,
) -> Result<String, MigratorError> {
    let invalid = || {
        MigratorError::new(MigratorErrorKind::Transport)
            .with_text(&format!("Cannot embed credentials in '{raw_url}'"))
    };
    let mut url = Url::parse(raw_url).map_err(|e| invalid().with_source(e))?;
    url.set_username(username).map_err(|_| invalid())?;
    url.set_password(Some(password)).map_err(|_| invalid())?;
    Ok(url.to_string())
}

/// Remove the credentials from a URL before logging it
pub fn redact_credentials(raw_url: &str) -> String {
    match Url::parse(raw_url) {
        Ok(mut url) => {
            let _ = url.set_password(None);
            let _ = url.set_username("");
            url.to_string()
        }
        Err(_) => raw_url.to_string(),
    }
}
