//! Error types for GitHub operations

use thiserror::Error;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during GitHub operations
#[derive(Error, Debug)]
pub enum Error {
    /// GitHub API error
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    /// Authentication error
    #[error("GitHub authentication error: {0}")]
    Auth(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
}

impl Error {
    /// HTTP status reported by GitHub, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api(octocrab::Error::GitHub { source, .. }) => Some(source.status_code.as_u16()),
            _ => None,
        }
    }
}

impl From<Error> for branchsync_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Api(octocrab::Error::GitHub { source, .. }) => branchsync_core::Error::Api {
                status: Some(source.status_code.as_u16()),
                message: source.message,
            },
            Error::Auth(msg) => branchsync_core::Error::Config(msg),
            other => branchsync_core::Error::api(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_maps_to_config_error() {
        let err: branchsync_core::Error = Error::Auth("Bad credentials".to_string()).into();
        assert!(matches!(err, branchsync_core::Error::Config(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_parse_maps_to_api_error() {
        let err: branchsync_core::Error = Error::Parse("unexpected body".to_string()).into();
        match err {
            branchsync_core::Error::Api { status, message } => {
                assert_eq!(status, None);
                assert!(message.contains("unexpected body"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_status_absent_for_non_api_errors() {
        assert_eq!(Error::Parse("x".to_string()).status(), None);
    }
}
