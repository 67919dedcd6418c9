//! # gitlab2github
//!
//! Migrate the projects of a GitLab group to a GitHub organization, with
//! their complete git history, labels, milestones, issues and merge requests
//!
//! ## Usage
//!
//! ```txt
//! Usage: gitlab2github [OPTIONS]
//!
//! Options:
//!  -r, --repo <REPO>      Only migrate the repository with this name
//!  -l, --list             List the repositories of the GitLab group
//!      --dry-run          Show what would be migrated, without migrating
//!      --force-private    Create every repository as private
//!  -c, --config <CONFIG>  Custom configuration file path
//!  -v, --verbose...       Verbose mode (-v, -vv)
//!  -h, --help             Print help
//! ```

#![warn(clippy::all, rust_2018_idioms)]
#![deny(
    missing_docs,
    clippy::all,
    clippy::missing_docs_in_private_items,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::missing_docs_in_private_items))]

pub(crate) mod cli;
pub(crate) mod config;
pub(crate) mod entities;
pub(crate) mod errors;
pub(crate) mod mapping;
pub(crate) mod migrate;
pub(crate) mod orchestrator;
pub(crate) mod outcome;
pub(crate) mod platform;
pub(crate) mod provision;
pub(crate) mod resolver;
pub(crate) mod transport;
pub(crate) mod utils;

mod github;
mod gitlab;

#[cfg(test)]
mod test_utils;

pub use cli::{gitlab2github_main, GitlabToGithubCli};
pub use config::MigrationConfig;
pub use errors::{MigratorError, MigratorErrorKind};
