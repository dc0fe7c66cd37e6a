//! Branchsync GitHub - GitHub hosting client for branchsync
//!
//! Implements [`branchsync_core::HostingClient`] on top of octocrab so the
//! reconciler can create refs, pull requests, labels and comments on a
//! GitHub repository.

mod client;
mod error;
mod hosting;

pub use client::GitHubClient;
pub use error::{Error, Result};
