//! Error handling for the gitlab2github crate.
use std::{error::Error as StdError, fmt};

use reqwest::StatusCode;

use crate::platform::PlatformType;

/// Error type for the gitlab2github crate.
#[derive(Debug)]
pub struct MigratorError {
    /// Inner error.
    inner: Box<Inner>,
}

impl MigratorError {
    /// Create a new error.
    pub(crate) fn new(kind: MigratorErrorKind) -> Self {
        Self {
            inner: Box::new(Inner {
                kind,
                source: None,
                platform: None,
                status: None,
            }),
        }
    }

    /// Create a new error with a source.
    pub(crate) fn new_with_source<E>(text: &str, e: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::new(MigratorErrorKind::Io)
            .with_text(text)
            .with_source(e)
    }

    /// Attach a text as the source of the error.
    pub(crate) fn with_text(mut self, text: &str) -> Self {
        self.inner.source = Some(Box::new(std::io::Error::other(text.to_string())));
        self
    }

    /// Attach a source error, keeping any text already attached.
    pub(crate) fn with_source<E>(mut self, e: E) -> Self
    where
        E: Into<BoxError>,
    {
        let e = e.into();
        self.inner.source = Some(match self.inner.source.take() {
            Some(text) => Box::new(std::io::Error::other(format!("{text}: {e}"))),
            None => e,
        });
        self
    }

    /// Attach the platform the error comes from.
    pub(crate) fn with_platform(mut self, platform: PlatformType) -> Self {
        self.inner.platform = Some(platform);
        self
    }

    /// Attach the HTTP status returned by a platform.
    pub(crate) fn with_status(mut self, status: StatusCode) -> Self {
        self.inner.status = Some(status);
        self
    }

    /// Kind of the error
    pub fn kind(&self) -> &MigratorErrorKind {
        &self.inner.kind
    }

    /// HTTP status, when the error comes from a platform response
    pub fn status(&self) -> Option<StatusCode> {
        self.inner.status
    }

    /// Platform the error comes from, if known
    pub fn platform(&self) -> Option<&PlatformType> {
        self.inner.platform.as_ref()
    }
}

/// Type alias for a boxed error.
pub(crate) type BoxError = Box<dyn StdError + Send + Sync>;

/// Inner error type for the gitlab2github crate.
#[derive(Debug)]
struct Inner {
    /// Error kind.
    kind: MigratorErrorKind,

    /// Platform error
    platform: Option<PlatformType>,

    /// HTTP status of the failed request
    status: Option<StatusCode>,

    /// Source error.
    source: Option<BoxError>,
}

/// Kinds of errors raised while migrating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigratorErrorKind {
    /// Missing or invalid configuration, fatal before any work starts.
    Configuration,

    /// The source group or project listing cannot be reached.
    SourceUnavailable,

    /// A named lookup matched nothing.
    NotFound,

    /// The destination repository cannot be created.
    Provision,

    /// The git history copy failed.
    Transport,

    /// A single label, milestone, issue or request failed.
    EntityMigration,

    /// Error related to the reqwest crate.
    Reqwest,

    /// Error related to serde.
    Serde,

    /// Error related to Git2.
    Git2,

    /// Error related to the filesystem or the process.
    Io,

    /// Error related to the configuration file format.
    Toml,
}

impl fmt::Display for MigratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.inner.kind)?;
        if let Some(platform) = &self.inner.platform {
            write!(f, " ({platform})")?;
        }
        if let Some(status) = &self.inner.status {
            write!(f, " [{status}]")?;
        }
        if let Some(source) = &self.inner.source {
            write!(f, ": {source}")?;
        }
        Ok(())
    }
}

impl StdError for MigratorError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source.as_ref().map(|e| &**e as _)
    }
}

impl From<reqwest::Error> for MigratorError {
    fn from(e: reqwest::Error) -> Self {
        let status = e.status();
        let mut error = Self::new(MigratorErrorKind::Reqwest).with_source(e);
        error.inner.status = status;
        error
    }
}

impl From<serde_json::Error> for MigratorError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(MigratorErrorKind::Serde).with_source(e)
    }
}

impl From<std::io::Error> for MigratorError {
    fn from(e: std::io::Error) -> Self {
        Self::new(MigratorErrorKind::Io).with_source(e)
    }
}

impl From<git2::Error> for MigratorError {
    fn from(e: git2::Error) -> Self {
        Self::new(MigratorErrorKind::Git2).with_source(e)
    }
}

impl From<toml::de::Error> for MigratorError {
    fn from(e: toml::de::Error) -> Self {
        Self::new(MigratorErrorKind::Toml).with_source(e)
    }
}

impl From<&str> for MigratorError {
    fn from(text: &str) -> Self {
        Self::new(MigratorErrorKind::Io).with_text(text)
    }
}

impl From<String> for MigratorError {
    fn from(text: String) -> Self {
        Self::new(MigratorErrorKind::Io).with_text(&text)
    }
}
