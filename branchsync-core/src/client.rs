//! Hosting API capability used by the reconciler
//!
//! The reconciler never talks to a hosting platform directly. It is handed
//! a [`HostingClient`] which is already authenticated and bound to one
//! repository.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::branch::BranchInfo;
use crate::Result;

/// Owner and name of a hosted repository
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryId {
    /// User or organization login
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepositoryId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Cross-repository head label for a branch (`owner:branch`)
    pub fn head_label(&self, branch: &str) -> String {
        format!("{}:{}", self.owner, branch)
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Result of asking the host to create a ref
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefCreation {
    /// The ref did not exist and now points at the requested commit
    Created,
    /// The ref was already present; nothing was changed
    AlreadyExists,
}

/// Result of merging a commit into a branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// A merge commit was created (or the branch fast-forwarded)
    Merged {
        /// SHA of the resulting commit
        sha: Option<String>,
    },
    /// The branch already contained the commit
    AlreadyUpToDate,
}

/// Minimal view of a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    /// PR number
    pub number: u64,
    /// Head branch name
    pub head_branch: String,
    /// Base branch name
    pub base_branch: String,
}

/// Files that differ between two refs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comparison {
    /// Paths of changed files
    pub files: Vec<String>,
}

impl Comparison {
    /// Whether the two refs have no file differences
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Authenticated access to one repository on a hosting platform
#[async_trait]
pub trait HostingClient: Send + Sync {
    /// Repository this client is bound to
    fn repository(&self) -> &RepositoryId;

    /// List every branch of the repository, draining all pages
    async fn list_branches(&self) -> Result<Vec<BranchInfo>>;

    /// Compare two refs (`base...head`)
    async fn compare(&self, base: &str, head: &str) -> Result<Comparison>;

    /// Create a ref (full name, e.g. `refs/heads/x`) pointing at `sha`
    async fn create_ref(&self, git_ref: &str, sha: &str) -> Result<RefCreation>;

    /// Open a pull request from `head` into `base`
    async fn open_pull_request(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequestRef>;

    /// List open pull requests filtered by head label (`owner:branch`) and base
    async fn list_open_pull_requests(
        &self,
        head_label: &str,
        base: &str,
    ) -> Result<Vec<PullRequestRef>>;

    /// Merge `head_sha` into `base_branch`
    async fn merge(&self, base_branch: &str, head_sha: &str) -> Result<MergeOutcome>;

    /// Set the labels of an issue or pull request, replacing any existing ones
    async fn replace_labels(&self, number: u64, labels: &[String]) -> Result<()>;

    /// Comment on an issue or pull request
    async fn create_comment(&self, number: u64, body: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_display_and_head_label() {
        let repo = RepositoryId::new("octo", "widgets");
        assert_eq!(repo.to_string(), "octo/widgets");
        assert_eq!(repo.head_label("sync/release-1-main"), "octo:sync/release-1-main");
    }

    #[test]
    fn test_comparison_is_empty() {
        assert!(Comparison::default().is_empty());
        assert!(!Comparison {
            files: vec!["src/lib.rs".to_string()]
        }
        .is_empty());
    }
}
