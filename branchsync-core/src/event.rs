//! Push event parsing and validation

use serde::Deserialize;

use crate::client::RepositoryId;
use crate::{Error, Result};

/// Prefix every branch ref carries
pub const REF_PREFIX: &str = "refs/heads/";

/// The subset of a push webhook payload needed to reconcile branches
#[derive(Debug, Clone, Deserialize)]
pub struct PushEvent {
    /// Full ref that was pushed (e.g. `refs/heads/main`)
    #[serde(rename = "ref")]
    pub git_ref: String,
    /// Commit SHA the ref points to after the push
    pub after: String,
    /// Whether the push deleted the ref
    #[serde(default)]
    pub deleted: bool,
    /// Repository that received the push
    pub repository: EventRepository,
}

/// Repository section of the payload
#[derive(Debug, Clone, Deserialize)]
pub struct EventRepository {
    /// Repository name
    pub name: String,
    /// Repository owner
    pub owner: EventOwner,
}

/// Owner section of the payload
///
/// Push payloads carry `login`; some older payloads only carry `name`.
#[derive(Debug, Clone, Deserialize)]
pub struct EventOwner {
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl PushEvent {
    /// Parse a webhook payload, rejecting any event kind other than `push`
    pub fn from_payload(event_name: &str, payload: &str) -> Result<Self> {
        if event_name != "push" {
            return Err(Error::InvalidEvent(format!(
                "Unsupported event: {}. Only push events can be synced",
                event_name
            )));
        }

        serde_json::from_str(payload)
            .map_err(|e| Error::InvalidEvent(format!("Could not parse push payload: {}", e)))
    }

    /// Name of the pushed branch
    ///
    /// Fails if the ref is not a branch ref or if the push deleted it.
    pub fn pushed_branch(&self) -> Result<&str> {
        let branch = self.git_ref.strip_prefix(REF_PREFIX).ok_or_else(|| {
            Error::InvalidEvent(format!(
                "Expected ref to start with \"{}\" but got \"{}\"",
                REF_PREFIX, self.git_ref
            ))
        })?;

        if self.deleted {
            return Err(Error::InvalidEvent(
                "Expected to not be triggered on ref deletion".to_string(),
            ));
        }

        if branch.is_empty() {
            return Err(Error::InvalidEvent(format!(
                "Ref \"{}\" does not name a branch",
                self.git_ref
            )));
        }

        Ok(branch)
    }

    /// Repository identity from the payload
    pub fn repository_id(&self) -> Result<RepositoryId> {
        let owner = self
            .repository
            .owner
            .login
            .clone()
            .or_else(|| self.repository.owner.name.clone())
            .filter(|o| !o.is_empty())
            .ok_or_else(|| {
                Error::InvalidEvent("Push payload has no repository owner".to_string())
            })?;

        Ok(RepositoryId::new(owner, self.repository.name.clone()))
    }
}
