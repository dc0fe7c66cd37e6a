//! Credential loading for branchsync
//!
//! The token is kept out of the regular configuration so the config file can
//! be shared. The secrets file lives at `~/.config/branchsync/secrets.toml`
//! and must have restrictive permissions (0600 on Unix).
//!
//! Loading priority:
//! 1. Environment variables (GITHUB_TOKEN, then INPUT_GITHUB_TOKEN)
//! 2. Secrets file (~/.config/branchsync/secrets.toml)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

const TOKEN_VARS: &[&str] = &["GITHUB_TOKEN", "INPUT_GITHUB_TOKEN"];

/// Secrets structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Secrets {
    /// GitHub configuration
    pub github: GitHubSecrets,
}

/// GitHub-related secrets
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubSecrets {
    /// GitHub token with contents and pull-request write access
    pub token: Option<String>,
}

impl Secrets {
    /// Load secrets from the default location
    ///
    /// Returns default (empty) secrets if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_secrets_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load secrets from a specific file with permission checking
    pub fn load_from_file(path: &Path) -> Result<Self> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let metadata = std::fs::metadata(path).map_err(Error::Io)?;
            let mode = metadata.permissions().mode();

            if mode & 0o077 != 0 {
                return Err(Error::Config(format!(
                    "Secrets file {} has insecure permissions {:o}. \
                     Please run: chmod 600 {}",
                    path.display(),
                    mode & 0o777,
                    path.display()
                )));
            }
        }

        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        let mut secrets: Secrets = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse secrets: {}", e)))?;

        if let Some(ref mut token) = secrets.github.token {
            *token = token.trim().to_string();
        }

        Ok(secrets)
    }

    /// Get the default secrets file path
    ///
    /// Returns `~/.config/branchsync/secrets.toml` on Unix
    pub fn default_secrets_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("branchsync").join("secrets.toml"))
    }

    /// Get the GitHub token from the process environment or the secrets file
    pub fn github_token(&self) -> Option<String> {
        self.github_token_from(|key| std::env::var(key).ok())
    }

    /// Get the GitHub token, consulting `lookup` for environment variables
    pub fn github_token_from<F>(&self, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        for var in TOKEN_VARS {
            if let Some(token) = lookup(var) {
                let token = token.trim().to_string();
                if !token.is_empty() {
                    debug!(var = *var, "Using GitHub token from environment");
                    return Some(token);
                }
            }
        }

        self.github
            .token
            .as_ref()
            .filter(|t| !t.is_empty())
            .map(|t| {
                debug!("Using GitHub token from secrets file");
                t.clone()
            })
    }

    /// Get the GitHub token or fail with a configuration error
    pub fn require_github_token(&self) -> Result<String> {
        self.github_token().ok_or_else(|| {
            Error::Config(
                "GitHub token not found. Set GITHUB_TOKEN or add a token to \
                 ~/.config/branchsync/secrets.toml"
                    .to_string(),
            )
        })
    }
}
