//! In-memory hosting client for testing
//!
//! Keeps refs and pull requests between calls so a second reconciliation of
//! the same push sees the state the first one left behind.

#![allow(dead_code)]

use async_trait::async_trait;
use branchsync_core::{
    BranchInfo, Comparison, Error, HostingClient, MergeOutcome, PullRequestRef, RefCreation,
    RepositoryId, Result,
};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// A recorded client call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListBranches,
    Compare { base: String, head: String },
    CreateRef { git_ref: String, sha: String },
    OpenPullRequest { head: String, base: String, title: String, body: String },
    ListOpenPullRequests { head_label: String, base: String },
    Merge { base: String, sha: String },
    ReplaceLabels { number: u64, labels: Vec<String> },
    CreateComment { number: u64, body: String },
}

impl Call {
    /// Whether this call changes remote state
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Call::CreateRef { .. }
                | Call::OpenPullRequest { .. }
                | Call::Merge { .. }
                | Call::ReplaceLabels { .. }
                | Call::CreateComment { .. }
        )
    }
}

#[derive(Debug, Clone)]
struct StoredPr {
    number: u64,
    owner: String,
    head: String,
    base: String,
}

/// Stateful mock of a hosting API
///
/// Features:
/// - Auto-incrementing PR numbers
/// - Refs and PRs persist across reconciliations
/// - Per-base diff configuration (non-empty by default)
/// - Call tracking for verification
/// - Error injection for failure path testing
pub struct MockHostingClient {
    repository: RepositoryId,
    next_pr_number: AtomicU64,
    branches: Mutex<Vec<BranchInfo>>,
    refs: Mutex<HashSet<String>>,
    prs: Mutex<Vec<StoredPr>>,
    identical_bases: Mutex<HashSet<String>>,
    labels: Mutex<HashMap<u64, Vec<String>>>,
    calls: Mutex<Vec<Call>>,
    // Error injection
    error_on_list_branches: Mutex<Option<String>>,
    error_on_create_ref: Mutex<Option<String>>,
    error_on_merge: Mutex<Option<String>>,
    error_on_labels: Mutex<Option<String>>,
    error_on_comment: Mutex<Option<String>>,
    error_on_compare: Mutex<HashSet<String>>,
    error_on_open_pr: Mutex<HashSet<String>>,
}

impl MockHostingClient {
    pub fn new(branches: Vec<BranchInfo>) -> Self {
        Self {
            repository: RepositoryId::new("octo", "widgets"),
            next_pr_number: AtomicU64::new(1),
            branches: Mutex::new(branches),
            refs: Mutex::new(HashSet::new()),
            prs: Mutex::new(Vec::new()),
            identical_bases: Mutex::new(HashSet::new()),
            labels: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            error_on_list_branches: Mutex::new(None),
            error_on_create_ref: Mutex::new(None),
            error_on_merge: Mutex::new(None),
            error_on_labels: Mutex::new(None),
            error_on_comment: Mutex::new(None),
            error_on_compare: Mutex::new(HashSet::new()),
            error_on_open_pr: Mutex::new(HashSet::new()),
        }
    }

    /// Protected branches with the given names
    pub fn with_protected(names: &[&str]) -> Self {
        Self::new(names.iter().map(|n| BranchInfo::new(*n, true)).collect())
    }

    // === State setup ===

    /// Make `compare` report no differences for a base branch
    pub fn set_identical(&self, base: &str) {
        self.identical_bases.lock().unwrap().insert(base.to_string());
    }

    /// Pretend a ref already exists
    pub fn add_ref(&self, git_ref: &str) {
        self.refs.lock().unwrap().insert(git_ref.to_string());
    }

    /// Add an open PR owned by this repository's owner; returns its number
    pub fn add_open_pr(&self, head: &str, base: &str) -> u64 {
        let number = self.next_pr_number.fetch_add(1, Ordering::SeqCst);
        self.prs.lock().unwrap().push(StoredPr {
            number,
            owner: self.repository.owner.clone(),
            head: head.to_string(),
            base: base.to_string(),
        });
        number
    }

    // === Error injection ===

    pub fn fail_list_branches(&self, msg: &str) {
        *self.error_on_list_branches.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `create_ref` return an error (rather than `AlreadyExists`)
    pub fn fail_create_ref(&self, msg: &str) {
        *self.error_on_create_ref.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_merge(&self, msg: &str) {
        *self.error_on_merge.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_labels(&self, msg: &str) {
        *self.error_on_labels.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_comment(&self, msg: &str) {
        *self.error_on_comment.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_compare_for(&self, base: &str) {
        self.error_on_compare.lock().unwrap().insert(base.to_string());
    }

    pub fn fail_open_pr_for(&self, base: &str) {
        self.error_on_open_pr.lock().unwrap().insert(base.to_string());
    }

    // === Inspection ===

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn has_ref(&self, git_ref: &str) -> bool {
        self.refs.lock().unwrap().contains(git_ref)
    }

    pub fn labels_of(&self, number: u64) -> Option<Vec<String>> {
        self.labels.lock().unwrap().get(&number).cloned()
    }

    pub fn open_pr_count(&self) -> usize {
        self.prs.lock().unwrap().len()
    }

    pub fn created_refs(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::CreateRef { git_ref, .. } => Some(git_ref),
                _ => None,
            })
            .collect()
    }

    pub fn opened_prs(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::OpenPullRequest { head, base, .. } => Some((head, base)),
                _ => None,
            })
            .collect()
    }

    pub fn comments(&self) -> Vec<(u64, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::CreateComment { number, body } => Some((number, body)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn injected(slot: &Mutex<Option<String>>) -> Result<()> {
        match slot.lock().unwrap().as_ref() {
            Some(msg) => Err(Error::Api {
                status: Some(500),
                message: msg.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl HostingClient for MockHostingClient {
    fn repository(&self) -> &RepositoryId {
        &self.repository
    }

    async fn list_branches(&self) -> Result<Vec<BranchInfo>> {
        self.record(Call::ListBranches);
        Self::injected(&self.error_on_list_branches)?;
        Ok(self.branches.lock().unwrap().clone())
    }

    async fn compare(&self, base: &str, head: &str) -> Result<Comparison> {
        self.record(Call::Compare {
            base: base.to_string(),
            head: head.to_string(),
        });
        if self.error_on_compare.lock().unwrap().contains(head) {
            return Err(Error::api(format!("compare {}...{} failed", base, head)));
        }
        if self.identical_bases.lock().unwrap().contains(head) {
            return Ok(Comparison::default());
        }
        Ok(Comparison {
            files: vec!["CHANGELOG.md".to_string()],
        })
    }

    async fn create_ref(&self, git_ref: &str, sha: &str) -> Result<RefCreation> {
        self.record(Call::CreateRef {
            git_ref: git_ref.to_string(),
            sha: sha.to_string(),
        });
        Self::injected(&self.error_on_create_ref)?;
        if self.refs.lock().unwrap().insert(git_ref.to_string()) {
            Ok(RefCreation::Created)
        } else {
            Ok(RefCreation::AlreadyExists)
        }
    }

    async fn open_pull_request(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequestRef> {
        self.record(Call::OpenPullRequest {
            head: head.to_string(),
            base: base.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        });
        if self.error_on_open_pr.lock().unwrap().contains(base) {
            return Err(Error::api("Validation Failed"));
        }
        let number = self.add_open_pr(head, base);
        Ok(PullRequestRef {
            number,
            head_branch: head.to_string(),
            base_branch: base.to_string(),
        })
    }

    async fn list_open_pull_requests(
        &self,
        head_label: &str,
        base: &str,
    ) -> Result<Vec<PullRequestRef>> {
        self.record(Call::ListOpenPullRequests {
            head_label: head_label.to_string(),
            base: base.to_string(),
        });
        Ok(self
            .prs
            .lock()
            .unwrap()
            .iter()
            .filter(|pr| format!("{}:{}", pr.owner, pr.head) == head_label && pr.base == base)
            .map(|pr| PullRequestRef {
                number: pr.number,
                head_branch: pr.head.clone(),
                base_branch: pr.base.clone(),
            })
            .collect())
    }

    async fn merge(&self, base_branch: &str, head_sha: &str) -> Result<MergeOutcome> {
        self.record(Call::Merge {
            base: base_branch.to_string(),
            sha: head_sha.to_string(),
        });
        Self::injected(&self.error_on_merge)?;
        Ok(MergeOutcome::Merged {
            sha: Some(format!("merge-{}", head_sha)),
        })
    }

    async fn replace_labels(&self, number: u64, labels: &[String]) -> Result<()> {
        self.record(Call::ReplaceLabels {
            number,
            labels: labels.to_vec(),
        });
        Self::injected(&self.error_on_labels)?;
        self.labels.lock().unwrap().insert(number, labels.to_vec());
        Ok(())
    }

    async fn create_comment(&self, number: u64, body: &str) -> Result<()> {
        self.record(Call::CreateComment {
            number,
            body: body.to_string(),
        });
        Self::injected(&self.error_on_comment)
    }
}
