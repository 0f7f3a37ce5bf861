//! Remote collaborators.
//!
//! Two blocking HTTP clients: the hosting-provider metadata lookup used for
//! unpinned deep links, and the authenticated content fetch used when a
//! credential is configured. Both are leaf concerns; every caller degrades
//! on error rather than propagating a failure into the audit workflow.

#![forbid(unsafe_code)]

use provaudit_export::{BranchLookupError, BranchResolver};
use serde::Deserialize;
use std::time::Duration;

const USER_AGENT: &str = concat!("provaudit/", env!("CARGO_PKG_VERSION"));

/// Branch lookups must never stall an export; short timeout, no retries.
const BRANCH_LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

/// Content fetches are interactive but can be large.
const CONTENT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url}: status {status}")]
    Status { url: String, status: u16 },

    #[error("decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("no default branch in response from {url}")]
    MissingBranch { url: String },
}

#[derive(Deserialize)]
struct RepoInfo {
    #[serde(default)]
    default_branch: String,
}

/// GitHub repository metadata client.
pub struct GithubApi {
    client: reqwest::blocking::Client,
    api_base: String,
}

impl GithubApi {
    pub fn new() -> Result<GithubApi, RemoteError> {
        GithubApi::with_base("https://api.github.com")
    }

    /// Point the client at a different API root (tests, proxies).
    pub fn with_base(api_base: impl Into<String>) -> Result<GithubApi, RemoteError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(BRANCH_LOOKUP_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(RemoteError::Client)?;
        Ok(GithubApi {
            client,
            api_base: api_base.into(),
        })
    }

    /// Default branch of `owner/repo` via the repository metadata endpoint.
    pub fn default_branch(&self, owner: &str, repo: &str) -> Result<String, RemoteError> {
        let url = format!("{}/repos/{owner}/{repo}", self.api_base);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|source| RemoteError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let info: RepoInfo = response.json().map_err(|source| RemoteError::Decode {
            url: url.clone(),
            source,
        })?;

        if info.default_branch.is_empty() {
            return Err(RemoteError::MissingBranch { url });
        }
        Ok(info.default_branch)
    }
}

impl BranchResolver for GithubApi {
    fn default_branch(&self, owner: &str, repo: &str) -> Result<String, BranchLookupError> {
        GithubApi::default_branch(self, owner, repo)
            .map_err(|err| BranchLookupError(err.to_string()))
    }
}

/// Authenticated fetch of matched file contents.
///
/// Callers must not construct this without a credential; absent credential
/// means metadata-only mode and this interface is never touched.
pub struct ContentClient {
    client: reqwest::blocking::Client,
    api_key: String,
}

impl ContentClient {
    pub fn new(api_key: impl Into<String>) -> Result<ContentClient, RemoteError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(CONTENT_FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(RemoteError::Client)?;
        Ok(ContentClient {
            client,
            api_key: api_key.into(),
        })
    }

    /// Raw text behind a content locator.
    pub fn fetch(&self, url: &str) -> Result<String, RemoteError> {
        let response = self
            .client
            .get(url)
            .header("X-API-Key", &self.api_key)
            .header("Content-Type", "application/json")
            .send()
            .map_err(|source| RemoteError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().map_err(|source| RemoteError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_against_unroutable_base_degrades_to_an_error() {
        // Discard port on loopback: refused immediately, no DNS involved.
        let api = GithubApi::with_base("http://127.0.0.1:9").expect("client");
        let err = api.default_branch("owner", "repo").expect_err("unroutable");
        assert!(matches!(err, RemoteError::Request { .. }));
    }

    #[test]
    fn resolver_impl_converts_errors_for_the_export_seam() {
        let api = GithubApi::with_base("http://127.0.0.1:9").expect("client");
        let result = BranchResolver::default_branch(&api, "owner", "repo");
        assert!(result.is_err());
    }
}
