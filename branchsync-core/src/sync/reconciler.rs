//! Per-push reconciliation across all base branches

use tracing::{error, info, info_span, Instrument};

use super::{
    BranchOutcome, BranchReport, ReconcileReport, SyncOptions, SyncOutcome, SyncTarget, Syncer,
};
use crate::branch::{select_base_branches, BranchSelection};
use crate::client::HostingClient;
use crate::event::PushEvent;
use crate::template::{TemplateSet, TemplateVars};
use crate::Result;

/// Drives a sync for every eligible base branch of a push
///
/// Base branches are processed strictly one after another. Two base
/// branches may render to the same synthetic head, and each sync must
/// finish before the next starts so their ref and PR lookups cannot race.
pub struct Reconciler<'a> {
    client: &'a dyn HostingClient,
    templates: &'a TemplateSet,
    options: SyncOptions,
}

impl<'a> Reconciler<'a> {
    pub fn new(client: &'a dyn HostingClient, templates: &'a TemplateSet) -> Self {
        Self {
            client,
            templates,
            options: SyncOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    /// Work out the sync targets for a push without changing anything
    ///
    /// Validates the event before any API call, lists branches, selects the
    /// bases and renders every target. A template error here aborts the
    /// whole run.
    pub async fn plan(
        &self,
        event: &PushEvent,
        selection: &BranchSelection,
    ) -> Result<Vec<SyncTarget>> {
        let pushed = event.pushed_branch()?;

        let branches = self.client.list_branches().await?;
        let bases = select_base_branches(&branches, selection, pushed);

        bases
            .into_iter()
            .map(|base| {
                let rendered = self.templates.render(&TemplateVars {
                    base: &base,
                    head: pushed,
                })?;
                Ok(SyncTarget {
                    base,
                    head: rendered.head,
                    title: rendered.title,
                    body: rendered.body,
                    labels: rendered.labels,
                })
            })
            .collect()
    }

    /// Sync every eligible base branch with the pushed branch
    ///
    /// Fails only for problems that concern the whole push (invalid event,
    /// branch listing, templates). A failure for one base branch is logged,
    /// recorded in the report and does not stop the remaining ones.
    pub async fn reconcile(
        &self,
        event: &PushEvent,
        selection: &BranchSelection,
    ) -> Result<ReconcileReport> {
        let targets = self.plan(event, selection).await?;
        let pushed = event.pushed_branch()?;
        let mut report = ReconcileReport::new(pushed);

        if targets.is_empty() {
            info!("No branches to sync.");
            return Ok(report);
        }

        info!(count = targets.len(), "Syncing branches with {}.", pushed);

        for target in targets {
            let span = info_span!("sync", base = %target.base, head = %pushed);
            let result = self
                .sync_base(pushed, &target, &event.after)
                .instrument(span.clone())
                .await;

            let outcome = span.in_scope(|| match result {
                Ok(Some(outcome)) => {
                    match outcome {
                        SyncOutcome::Created { number } => info!("PR #{} has been created.", number),
                        SyncOutcome::Updated { number } => info!("PR #{} has been updated.", number),
                        SyncOutcome::Stale { number } => {
                            info!("PR #{} is out of date; a comment was posted.", number)
                        }
                    }
                    BranchOutcome::Synced { outcome }
                }
                Ok(None) => BranchOutcome::Skipped,
                Err(e) => {
                    error!(error = %e, "Could not sync {} with {}", target.base, pushed);
                    BranchOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            });

            report.branches.push(BranchReport {
                base: target.base,
                head: target.head,
                outcome,
            });
        }

        info!(
            synced = report.synced_count(),
            skipped = report.skipped_count(),
            failed = report.failed_count(),
            "Finished syncing branches with {}.",
            pushed
        );

        Ok(report)
    }

    async fn sync_base(
        &self,
        pushed: &str,
        target: &SyncTarget,
        commit_sha: &str,
    ) -> Result<Option<SyncOutcome>> {
        info!("Syncing {} with {}.", target.base, pushed);

        let comparison = self.client.compare(pushed, &target.base).await?;
        if comparison.is_empty() {
            info!("The two branches have no differences, nothing to do.");
            return Ok(None);
        }

        let outcome = Syncer::new(self.client, self.options)
            .sync_once(target, commit_sha)
            .await?;
        Ok(Some(outcome))
    }
}
