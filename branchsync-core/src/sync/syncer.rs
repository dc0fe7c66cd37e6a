//! Create-or-update protocol for one base branch
//!
//! ```text
//! NoRef --create ok--> RefCreated --open PR, labels--> Created
//! NoRef --create fails--> RefExists
//! RefExists --exactly one open PR--> PRFound
//! RefExists --zero or several PRs--> AmbiguousState (error)
//! PRFound --merge ok--> Updated
//! PRFound --merge fails--> comment posted --> Stale
//! ```

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::client::{HostingClient, MergeOutcome, RefCreation};
use crate::event::REF_PREFIX;
use crate::{Error, Result};

/// Everything needed to sync one base branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTarget {
    /// Branch receiving the pull request
    pub base: String,
    /// Synthetic branch carrying the sync
    pub head: String,
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}

impl SyncTarget {
    /// Full ref name of the synthetic head branch
    pub fn head_ref(&self) -> String {
        format!("{}{}", REF_PREFIX, self.head)
    }
}

/// How a successful sync ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// A new ref and pull request were created
    Created { number: u64 },
    /// The existing pull request's head branch now contains the commit
    Updated { number: u64 },
    /// The existing pull request could not be updated; a comment says so
    Stale { number: u64 },
}

impl SyncOutcome {
    /// Number of the pull request this sync ensured
    pub fn number(&self) -> u64 {
        match *self {
            SyncOutcome::Created { number }
            | SyncOutcome::Updated { number }
            | SyncOutcome::Stale { number } => number,
        }
    }
}

/// Protocol switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Treat a failed ref creation as a failure instead of "ref already exists"
    pub strict_ref_creation: bool,
}

/// Runs the create-or-update protocol against a hosting client
pub struct Syncer<'a> {
    client: &'a dyn HostingClient,
    options: SyncOptions,
}

impl<'a> Syncer<'a> {
    pub fn new(client: &'a dyn HostingClient, options: SyncOptions) -> Self {
        Self { client, options }
    }

    /// Ensure an open pull request from `target.head` into `target.base` contains `commit_sha`
    pub async fn sync_once(&self, target: &SyncTarget, commit_sha: &str) -> Result<SyncOutcome> {
        let git_ref = target.head_ref();

        let created = match self.client.create_ref(&git_ref, commit_sha).await {
            Ok(RefCreation::Created) => {
                debug!(git_ref = %git_ref, sha = %commit_sha, "Created reference");
                true
            }
            Ok(RefCreation::AlreadyExists) => {
                info!("Reference \"{}\" already exists", git_ref);
                false
            }
            Err(e) if self.options.strict_ref_creation => return Err(e),
            Err(e) => {
                warn!(
                    error = %e,
                    "Could not create reference \"{}\"; assuming that it already exists",
                    git_ref
                );
                false
            }
        };

        if created {
            self.open(target).await
        } else {
            self.update(target, commit_sha).await
        }
    }

    async fn open(&self, target: &SyncTarget) -> Result<SyncOutcome> {
        let pr = self
            .client
            .open_pull_request(&target.head, &target.base, &target.title, &target.body)
            .await?;
        info!(number = pr.number, "Opened pull request");

        if !target.labels.is_empty() {
            self.client.replace_labels(pr.number, &target.labels).await?;
            debug!(number = pr.number, labels = ?target.labels, "Applied labels");
        }

        Ok(SyncOutcome::Created { number: pr.number })
    }

    async fn update(&self, target: &SyncTarget, commit_sha: &str) -> Result<SyncOutcome> {
        let head_label = self.client.repository().head_label(&target.head);
        let prs = self
            .client
            .list_open_pull_requests(&head_label, &target.base)
            .await?;

        let number = match prs.as_slice() {
            [pr] => pr.number,
            _ => {
                return Err(Error::AmbiguousState {
                    head: head_label,
                    base: target.base.clone(),
                    matched: prs.iter().map(|pr| pr.number).collect(),
                })
            }
        };

        match self.client.merge(&target.head, commit_sha).await {
            Ok(MergeOutcome::Merged { sha }) => {
                info!(number, merge_sha = ?sha, "Merged {} into {}", commit_sha, target.head);
                Ok(SyncOutcome::Updated { number })
            }
            Ok(MergeOutcome::AlreadyUpToDate) => {
                info!(number, "{} already contains {}", target.head, commit_sha);
                Ok(SyncOutcome::Updated { number })
            }
            Err(e) => {
                error!(number, error = %e, "Could not merge {} into {}", commit_sha, target.head);
                self.client
                    .create_comment(number, &stale_comment(commit_sha))
                    .await?;
                Ok(SyncOutcome::Stale { number })
            }
        }
    }
}

/// Comment posted on a sync pull request whose head could not be updated
pub fn stale_comment(commit_sha: &str) -> String {
    format!(
        "Could not update this syncing PR: failed to merge {}.",
        commit_sha
    )
}
