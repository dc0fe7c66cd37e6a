//! Configuration management for branchsync
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (BRANCHSYNC_*, or the INPUT_* names GitHub Actions uses)
//! 3. Config file (~/.config/branchsync/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Templates for the fields of each sync pull request
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct TemplateConfig {
    /// Synthetic head branch name
    pub head: String,
    /// Pull request title
    pub title: String,
    /// Pull request body
    pub body: String,
    /// JSON array of label names
    pub labels: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            head: "sync/{{ base }}-{{ head }}".to_string(),
            title: "Sync {{ base }} with {{ head }}".to_string(),
            body: "Brings the latest commits of `{{ head }}` into `{{ base }}`.".to_string(),
            labels: "[]".to_string(),
        }
    }
}

/// Base-branch selection and protocol behavior
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct SyncConfig {
    /// Glob selecting base branches; protected branches when unset
    pub branches_pattern: Option<String>,

    /// Fail a base branch when ref creation errors for a reason other than
    /// the ref already existing, instead of falling back to the update path
    pub strict_ref_creation: bool,
}

/// GitHub API settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct GitHubConfig {
    /// API base URL (None for api.github.com)
    pub api_url: Option<String>,

    /// Connect/read timeout for API requests
    #[serde(with = "humantime_serde")]
    pub request_timeout: Option<Duration>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            request_timeout: Some(Duration::from_secs(30)),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub templates: TemplateConfig,
    pub sync: SyncConfig,
    pub github: GitHubConfig,
}

/// Overrides supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub branches_pattern: Option<String>,
    pub head_template: Option<String>,
    pub title_template: Option<String>,
    pub body_template: Option<String>,
    pub labels_template: Option<String>,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/branchsync/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("branchsync").join("config.toml"))
    }

    /// Apply environment variable overrides from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Apply environment variable overrides from a lookup function
    ///
    /// Supported variables (BRANCHSYNC_* wins over INPUT_*):
    /// - BRANCHSYNC_BRANCHES_PATTERN / INPUT_BRANCHES_PATTERN
    /// - BRANCHSYNC_HEAD_TEMPLATE / INPUT_HEAD_TEMPLATE
    /// - BRANCHSYNC_TITLE_TEMPLATE / INPUT_TITLE_TEMPLATE
    /// - BRANCHSYNC_BODY_TEMPLATE / INPUT_BODY_TEMPLATE
    /// - BRANCHSYNC_LABELS_TEMPLATE / INPUT_LABELS_TEMPLATE
    /// - BRANCHSYNC_STRICT_REF_CREATION (true/false)
    /// - BRANCHSYNC_API_URL / GITHUB_API_URL
    pub fn with_env_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(&format!("BRANCHSYNC_{}", name))
                .or_else(|| lookup(&format!("INPUT_{}", name)))
                .filter(|v| !v.is_empty())
        };

        if let Some(pattern) = get("BRANCHES_PATTERN") {
            self.sync.branches_pattern = Some(pattern);
        }
        if let Some(head) = get("HEAD_TEMPLATE") {
            self.templates.head = head;
        }
        if let Some(title) = get("TITLE_TEMPLATE") {
            self.templates.title = title;
        }
        if let Some(body) = get("BODY_TEMPLATE") {
            self.templates.body = body;
        }
        if let Some(labels) = get("LABELS_TEMPLATE") {
            self.templates.labels = labels;
        }
        if let Some(strict) = lookup("BRANCHSYNC_STRICT_REF_CREATION") {
            self.sync.strict_ref_creation = matches!(strict.trim(), "1" | "true" | "yes");
        }
        if let Some(url) = lookup("BRANCHSYNC_API_URL")
            .or_else(|| lookup("GITHUB_API_URL"))
            .filter(|v| !v.is_empty())
        {
            self.github.api_url = Some(url);
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, overrides: CliOverrides) -> Self {
        if let Some(pattern) = overrides.branches_pattern {
            self.sync.branches_pattern = Some(pattern);
        }
        if let Some(head) = overrides.head_template {
            self.templates.head = head;
        }
        if let Some(title) = overrides.title_template {
            self.templates.title = title;
        }
        if let Some(body) = overrides.body_template {
            self.templates.body = body;
        }
        if let Some(labels) = overrides.labels_template {
            self.templates.labels = labels;
        }

        self
    }

    /// Check values that cannot be expressed in the type system
    pub fn validate(&self) -> Result<()> {
        if let Some(ref api_url) = self.github.api_url {
            let parsed = url::Url::parse(api_url)
                .map_err(|e| Error::Config(format!("Invalid API URL {}: {}", api_url, e)))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(Error::Config(format!(
                    "API URL must be http(s), got {}",
                    api_url
                )));
            }
        }

        Ok(())
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(overrides: CliOverrides) -> Result<Self> {
        let config = Self::load()?
            .with_env_overrides()
            .with_cli_overrides(overrides);
        config.validate()?;
        Ok(config)
    }
}
