//! [`HostingClient`] implementation for GitHub
//!
//! Responses are decoded into small local structs holding only the fields
//! the reconciler reads, rather than octocrab's full models.

use async_trait::async_trait;
use branchsync_core::{
    BranchInfo, Comparison, HostingClient, MergeOutcome, PullRequestRef, RefCreation,
    RepositoryId,
};
use octocrab::Page;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::{Error, GitHubClient};

const PER_PAGE: u8 = 100;

#[derive(Deserialize)]
struct BranchItem {
    name: String,
    #[serde(default)]
    protected: bool,
}

#[derive(Deserialize)]
struct RefItem {
    #[serde(rename = "ref")]
    ref_field: String,
}

#[derive(Deserialize)]
struct PullItem {
    number: u64,
    head: RefItem,
    base: RefItem,
}

impl From<PullItem> for PullRequestRef {
    fn from(pr: PullItem) -> Self {
        PullRequestRef {
            number: pr.number,
            head_branch: pr.head.ref_field,
            base_branch: pr.base.ref_field,
        }
    }
}

#[derive(Deserialize)]
struct CompareResponse {
    #[serde(default)]
    files: Option<Vec<FileItem>>,
}

#[derive(Deserialize)]
struct FileItem {
    filename: String,
}

#[derive(Deserialize)]
struct MergeCommit {
    sha: Option<String>,
}

/// Percent-encode a branch name for use as one URL path segment
///
/// Git allows `#`, `%` and `/` in branch names, none of which may appear
/// raw inside a single segment.
fn path_segment(name: &str) -> String {
    url::form_urlencoded::byte_serialize(name.as_bytes()).collect()
}

/// Whether a create-ref failure is GitHub saying the ref is already there
fn is_ref_conflict(err: &octocrab::Error) -> bool {
    match err {
        octocrab::Error::GitHub { source, .. } => {
            source.status_code.as_u16() == 422
                && source.message.to_lowercase().contains("already exists")
        }
        _ => false,
    }
}

type CoreResult<T> = branchsync_core::Result<T>;

#[async_trait]
impl HostingClient for GitHubClient {
    fn repository(&self) -> &RepositoryId {
        self.repository_id()
    }

    async fn list_branches(&self) -> CoreResult<Vec<BranchInfo>> {
        debug!("Listing branches");

        let first: Page<BranchItem> = self
            .client()
            .get(self.route("branches"), Some(&[("per_page", PER_PAGE)]))
            .await
            .map_err(Error::Api)?;
        let items = self.client().all_pages(first).await.map_err(Error::Api)?;

        debug!(count = items.len(), "Fetched branches");

        Ok(items
            .into_iter()
            .map(|b| BranchInfo::new(b.name, b.protected))
            .collect())
    }

    async fn compare(&self, base: &str, head: &str) -> CoreResult<Comparison> {
        debug!(base, head, "Comparing branches");

        let response: CompareResponse = self
            .client()
            .get(
                self.route(&format!(
                    "compare/{}...{}",
                    path_segment(base),
                    path_segment(head)
                )),
                None::<&()>,
            )
            .await
            .map_err(Error::Api)?;

        Ok(Comparison {
            files: response
                .files
                .unwrap_or_default()
                .into_iter()
                .map(|f| f.filename)
                .collect(),
        })
    }

    async fn create_ref(&self, git_ref: &str, sha: &str) -> CoreResult<RefCreation> {
        debug!(git_ref, sha, "Creating reference");

        let result: octocrab::Result<serde_json::Value> = self
            .client()
            .post(self.route("git/refs"), Some(&json!({ "ref": git_ref, "sha": sha })))
            .await;

        match result {
            Ok(_) => Ok(RefCreation::Created),
            Err(e) if is_ref_conflict(&e) => Ok(RefCreation::AlreadyExists),
            Err(e) => Err(Error::Api(e).into()),
        }
    }

    async fn open_pull_request(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> CoreResult<PullRequestRef> {
        debug!(head, base, "Opening pull request");

        let pr: PullItem = self
            .client()
            .post(
                self.route("pulls"),
                Some(&json!({
                    "head": head,
                    "base": base,
                    "title": title,
                    "body": body,
                })),
            )
            .await
            .map_err(Error::Api)?;

        Ok(pr.into())
    }

    async fn list_open_pull_requests(
        &self,
        head_label: &str,
        base: &str,
    ) -> CoreResult<Vec<PullRequestRef>> {
        debug!(head_label, base, "Listing open pull requests");

        let first: Page<PullItem> = self
            .client()
            .get(
                self.route("pulls"),
                Some(&json!({
                    "state": "open",
                    "head": head_label,
                    "base": base,
                    "per_page": PER_PAGE,
                })),
            )
            .await
            .map_err(Error::Api)?;
        let items = self.client().all_pages(first).await.map_err(Error::Api)?;

        Ok(items.into_iter().map(PullRequestRef::from).collect())
    }

    async fn merge(&self, base_branch: &str, head_sha: &str) -> CoreResult<MergeOutcome> {
        debug!(base_branch, head_sha, "Merging commit");

        let response = self
            .client()
            ._post(
                self.route("merges"),
                Some(&json!({ "base": base_branch, "head": head_sha })),
            )
            .await
            .map_err(Error::Api)?;
        let response = octocrab::map_github_error(response)
            .await
            .map_err(Error::Api)?;

        // 204 means the base already contains the head
        if response.status().as_u16() == 204 {
            return Ok(MergeOutcome::AlreadyUpToDate);
        }

        let body = self
            .client()
            .body_to_string(response)
            .await
            .map_err(Error::Api)?;
        let commit: MergeCommit = serde_json::from_str(&body)
            .map_err(|e| Error::Parse(format!("Unexpected merge response: {}", e)))?;

        Ok(MergeOutcome::Merged { sha: commit.sha })
    }

    async fn replace_labels(&self, number: u64, labels: &[String]) -> CoreResult<()> {
        debug!(number, ?labels, "Replacing labels");

        let _: serde_json::Value = self
            .client()
            .put(
                self.route(&format!("issues/{}/labels", number)),
                Some(&json!({ "labels": labels })),
            )
            .await
            .map_err(Error::Api)?;

        Ok(())
    }

    async fn create_comment(&self, number: u64, body: &str) -> CoreResult<()> {
        debug!(number, "Creating comment");

        let _: serde_json::Value = self
            .client()
            .post(
                self.route(&format!("issues/{}/comments", number)),
                Some(&json!({ "body": body })),
            )
            .await
            .map_err(Error::Api)?;

        Ok(())
    }
}
