//! GitHub API client using octocrab

use branchsync_core::{GitHubConfig, RepositoryId};
use octocrab::Octocrab;
use tracing::{debug, info};

use crate::{Error, Result};

/// GitHub API client bound to one repository
pub struct GitHubClient {
    client: Octocrab,
    repository: RepositoryId,
}

impl GitHubClient {
    /// Create a new GitHub client for the specified repository
    ///
    /// The token is resolved by the caller (see `branchsync_core::Secrets`).
    pub fn new(token: &str, repository: RepositoryId, config: &GitHubConfig) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(Error::Auth("GitHub token is empty".to_string()));
        }

        let mut builder = Octocrab::builder().personal_token(token.to_string());

        if let Some(ref api_url) = config.api_url {
            builder = builder
                .base_uri(api_url.as_str())
                .map_err(|e| Error::Parse(format!("Invalid API URL {}: {}", api_url, e)))?;
        }

        if let Some(timeout) = config.request_timeout {
            builder = builder
                .set_connect_timeout(Some(timeout))
                .set_read_timeout(Some(timeout));
        }

        let client = builder
            .build()
            .map_err(|e| Error::Auth(format!("Failed to create GitHub client: {}", e)))?;

        info!(repository = %repository, api_url = ?config.api_url, "Created GitHub client");

        Ok(Self { client, repository })
    }

    /// Wrap an already configured octocrab instance
    pub fn with_octocrab(client: Octocrab, repository: RepositoryId) -> Self {
        debug!(repository = %repository, "Using provided octocrab client");
        Self { client, repository }
    }

    /// Get the repository owner
    pub fn owner(&self) -> &str {
        &self.repository.owner
    }

    /// Get the repository name
    pub fn repo(&self) -> &str {
        &self.repository.name
    }

    /// Get the underlying octocrab client
    pub fn client(&self) -> &Octocrab {
        &self.client
    }

    pub(crate) fn repository_id(&self) -> &RepositoryId {
        &self.repository
    }

    /// REST route under this repository, e.g. `/repos/octo/widgets/merges`
    pub(crate) fn route(&self, suffix: &str) -> String {
        format!("/repos/{}/{}/{}", self.owner(), self.repo(), suffix)
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("owner", &self.repository.owner)
            .field("repo", &self.repository.name)
            .finish_non_exhaustive()
    }
}
