//! Gitlab API module, the source platform.
pub(crate) mod config;
pub(crate) mod platform;
pub(crate) mod types;

/// Path of the REST API on a Gitlab instance
const GITLAB_API_PATH: &str = "/api/v4";

/// Header carrying the personal access token
const GITLAB_TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// Username Gitlab expects with a token over https
const GITLAB_TRANSPORT_USER: &str = "oauth2";

/// Page size of every listing
const PER_PAGE: usize = 100;
