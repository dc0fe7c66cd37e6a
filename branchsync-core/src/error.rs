//! Error types for branch reconciliation

use thiserror::Error;

/// Result type alias for branchsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for branchsync operations
#[derive(Error, Debug)]
pub enum Error {
    /// The triggering event cannot be reconciled (bad ref, deletion, wrong kind)
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    /// A title/body/head/labels template failed to compile or render
    #[error("Template error: {0}")]
    Template(String),

    /// An existing sync ref did not resolve to exactly one open pull request
    #[error(
        "Expected one and only one PR to match {head} into {base} but matched with: [{}]",
        format_numbers(.matched)
    )]
    AmbiguousState {
        /// Head label used for the lookup (`owner:branch`)
        head: String,
        /// Base branch of the lookup
        base: String,
        /// Numbers of the pull requests that matched
        matched: Vec<u64>,
    },

    /// Hosting API call failed
    #[error("API error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Api {
        /// HTTP status reported by the API, if any
        status: Option<u16>,
        /// Error message
        message: String,
    },

    /// Configuration or credential error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build an API error without an HTTP status
    pub fn api(message: impl Into<String>) -> Self {
        Error::Api {
            status: None,
            message: message.into(),
        }
    }

    /// Whether this error aborts the whole invocation rather than a single base branch
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::AmbiguousState { .. } | Error::Api { .. })
    }
}

fn format_numbers(numbers: &[u64]) -> String {
    numbers
        .iter()
        .map(|n| format!("#{}", n))
        .collect::<Vec<_>>()
        .join(", ")
}
