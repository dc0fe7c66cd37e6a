//! Run command - reconcile base branches for one push event

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use branchsync_core::{
    BranchSelection, CliOverrides, Config, PushEvent, Reconciler, Secrets, SyncOptions,
    TemplateSet,
};
use branchsync_github::GitHubClient;
use clap::Args;

/// Name of the output written to `GITHUB_OUTPUT`
const OUTPUT_NAME: &str = "created_pull_requests";

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the push event payload (JSON)
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event: PathBuf,

    /// Kind of the triggering event
    #[arg(long, env = "GITHUB_EVENT_NAME", default_value = "push")]
    pub event_name: String,

    /// Glob selecting base branches (protected branches when unset)
    #[arg(long)]
    pub branches: Option<String>,

    /// Template for the synthetic head branch name
    #[arg(long)]
    pub head_template: Option<String>,

    /// Template for the pull request title
    #[arg(long)]
    pub title_template: Option<String>,

    /// Template for the pull request body
    #[arg(long)]
    pub body_template: Option<String>,

    /// Template rendering a JSON array of labels
    #[arg(long)]
    pub labels_template: Option<String>,

    /// File to append `created_pull_requests=<json>` to
    #[arg(long, env = "GITHUB_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Dry run - list branches and show planned syncs without changing anything
    #[arg(long)]
    pub dry_run: bool,
}

impl RunArgs {
    /// Config overrides carried by this command's flags
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            branches_pattern: self.branches.clone(),
            head_template: self.head_template.clone(),
            title_template: self.title_template.clone(),
            body_template: self.body_template.clone(),
            labels_template: self.labels_template.clone(),
        }
    }

    /// Execute the run command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let payload = std::fs::read_to_string(&self.event).with_context(|| {
            format!("Failed to read event payload {}", self.event.display())
        })?;
        let event = PushEvent::from_payload(&self.event_name, &payload)?;
        let pushed = event.pushed_branch()?;
        let repository = event.repository_id()?;

        let templates = TemplateSet::new(&config.templates)?;
        let selection = BranchSelection::from_pattern(config.sync.branches_pattern.as_deref())?;

        tracing::info!(
            repository = %repository,
            pushed_branch = %pushed,
            after = %event.after,
            "Loaded push event"
        );

        let token = Secrets::load()?.require_github_token()?;
        let client = GitHubClient::new(&token, repository, &config.github)?;

        let reconciler = Reconciler::new(&client, &templates).with_options(SyncOptions {
            strict_ref_creation: config.sync.strict_ref_creation,
        });

        if self.dry_run {
            let targets = reconciler.plan(&event, &selection).await?;
            if targets.is_empty() {
                println!("[Dry run] No branches to sync");
            }
            for target in &targets {
                println!(
                    "[Dry run] Would sync {} with {} via {} (title: {:?}, labels: {:?})",
                    target.base, pushed, target.head, target.title, target.labels
                );
            }
            return Ok(());
        }

        let report = reconciler.reconcile(&event, &selection).await?;

        for (base, error) in report.failures() {
            tracing::warn!(base, error, "Base branch was not synced");
        }

        let json = serde_json::to_string(&report.pull_requests())?;
        println!("{}", json);

        if let Some(ref path) = self.output {
            write_output(path, OUTPUT_NAME, &json)?;
        }

        Ok(())
    }
}

/// Append a `name=value` line to a GitHub Actions output file
fn write_output(path: &Path, name: &str, value: &str) -> anyhow::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open output file {}", path.display()))?;
    writeln!(file, "{}={}", name, value)
        .with_context(|| format!("Failed to write output file {}", path.display()))?;
    Ok(())
}
