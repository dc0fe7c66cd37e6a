//! Branchsync CLI - keep long-lived branches in sync through pull requests
//!
//! Meant to run once per push, typically from a GitHub Actions workflow.

mod commands;

use clap::{Parser, Subcommand};
use branchsync_core::{CliOverrides, Config};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::RunArgs;

/// Branchsync: open or advance a sync pull request for every tracking branch
#[derive(Parser, Debug)]
#[command(name = "branchsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Sync base branches with the branch a push event targets
    #[command(visible_alias = "r")]
    Run(RunArgs),

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the result JSON
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let overrides = match cli.command {
        Some(Commands::Run(ref args)) => args.overrides(),
        _ => CliOverrides::default(),
    };
    let config = Config::load_with_overrides(overrides)?;

    if cli.verbose {
        tracing::debug!(?config, "Configuration loaded");
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("branchsync {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Run(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Config) => {
            println!("Branchsync Configuration");
            println!("========================");
            println!();
            println!("Templates:");
            println!("  head: {}", config.templates.head);
            println!("  title: {}", config.templates.title);
            println!("  body: {}", config.templates.body);
            println!("  labels: {}", config.templates.labels);
            println!();
            println!("Sync:");
            println!(
                "  branches_pattern: {}",
                config
                    .sync
                    .branches_pattern
                    .as_deref()
                    .unwrap_or("(protected branches)")
            );
            println!("  strict_ref_creation: {}", config.sync.strict_ref_creation);
            println!();
            println!("GitHub:");
            println!(
                "  api_url: {}",
                config.github.api_url.as_deref().unwrap_or("(default)")
            );
            println!(
                "  request_timeout: {}",
                config
                    .github
                    .request_timeout
                    .map(|t| format!("{}s", t.as_secs()))
                    .unwrap_or_else(|| "(none)".to_string())
            );
            println!();
            if let Some(path) = Config::default_config_path() {
                println!("Config file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - using defaults)");
                }
            }
        }
        None => {
            println!("Branchsync - keep long-lived branches in sync through pull requests");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
