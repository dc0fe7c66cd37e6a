//! Branch sync reconciliation
//!
//! [`Reconciler`] decides which base branches need a sync for a push and
//! walks them one at a time; [`Syncer`] runs the create-or-update protocol
//! for a single base branch.

mod reconciler;
mod report;
mod syncer;

pub use reconciler::Reconciler;
pub use report::{BranchOutcome, BranchReport, ReconcileReport};
pub use syncer::{stale_comment, SyncOptions, SyncOutcome, SyncTarget, Syncer};
