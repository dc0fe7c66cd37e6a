//! Branchsync Core - keeps long-lived branches in sync through pull requests
//!
//! When a branch receives a push, every other branch that should track it
//! gets a pull request carrying the new commits. This crate holds the
//! reconciliation logic; the hosting API is reached through the
//! [`HostingClient`] trait so it can be backed by GitHub or a test double.

pub mod branch;
pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod secrets;
pub mod sync;
pub mod template;

pub use branch::{select_base_branches, BranchInfo, BranchPattern, BranchSelection};
pub use client::{
    Comparison, HostingClient, MergeOutcome, PullRequestRef, RefCreation, RepositoryId,
};
pub use config::{CliOverrides, Config, GitHubConfig, SyncConfig, TemplateConfig};
pub use error::{Error, Result};
pub use event::{PushEvent, REF_PREFIX};
pub use secrets::{GitHubSecrets, Secrets};
pub use sync::{
    stale_comment, BranchOutcome, BranchReport, ReconcileReport, Reconciler, SyncOptions,
    SyncOutcome, SyncTarget, Syncer,
};
pub use template::{RenderedTarget, TemplateSet, TemplateVars};
