//! Aggregated results of one reconciliation run

use std::collections::BTreeMap;

use serde::Serialize;

use super::SyncOutcome;

/// What happened to one base branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum BranchOutcome {
    /// A pull request is open for the sync
    Synced { outcome: SyncOutcome },
    /// No file differences; nothing was created
    Skipped,
    /// The protocol failed for this base branch only
    Failed { error: String },
}

/// Per-base-branch entry, in processing order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchReport {
    pub base: String,
    /// Synthetic head branch rendered for this base
    pub head: String,
    #[serde(flatten)]
    pub outcome: BranchOutcome,
}

/// Result of reconciling one push
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Branch that was pushed
    pub pushed_branch: String,
    /// One entry per base branch considered
    pub branches: Vec<BranchReport>,
}

impl ReconcileReport {
    pub fn new(pushed_branch: impl Into<String>) -> Self {
        Self {
            pushed_branch: pushed_branch.into(),
            branches: Vec::new(),
        }
    }

    /// Base branch to pull request number, for every base synced this run
    pub fn pull_requests(&self) -> BTreeMap<String, u64> {
        self.branches
            .iter()
            .filter_map(|b| match &b.outcome {
                BranchOutcome::Synced { outcome } => Some((b.base.clone(), outcome.number())),
                _ => None,
            })
            .collect()
    }

    pub fn synced_count(&self) -> usize {
        self.count(|o| matches!(o, BranchOutcome::Synced { .. }))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, BranchOutcome::Skipped))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, BranchOutcome::Failed { .. }))
    }

    /// Base branches whose sync failed, with the error message
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.branches.iter().filter_map(|b| match &b.outcome {
            BranchOutcome::Failed { error } => Some((b.base.as_str(), error.as_str())),
            _ => None,
        })
    }

    fn count(&self, pred: impl Fn(&BranchOutcome) -> bool) -> usize {
        self.branches.iter().filter(|b| pred(&b.outcome)).count()
    }
}
