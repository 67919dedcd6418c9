//! GitHub API module, the destination platform.
pub(crate) mod config;
pub(crate) mod platform;
pub(crate) mod repo;

/// GitHub API URL
const GITHUB_API_URL: &str = "api.github.com";

/// GitHub API Header
const GITHUB_API_HEADER: &str = "X-GitHub-Api-Version";

/// GitHub API Version
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Username GitHub accepts with a token over https
const GITHUB_TRANSPORT_USER: &str = "x-access-token";

/// Page size of every listing
const PER_PAGE: usize = 100;
