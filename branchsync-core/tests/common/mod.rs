//! Shared test utilities

pub mod mock_client;

pub use mock_client::{Call, MockHostingClient};

use branchsync_core::PushEvent;

/// Build a push event for `octo/widgets`
pub fn push_event(git_ref: &str, after: &str, deleted: bool) -> PushEvent {
    let payload = serde_json::json!({
        "ref": git_ref,
        "after": after,
        "deleted": deleted,
        "repository": {
            "name": "widgets",
            "owner": { "login": "octo" }
        }
    });
    PushEvent::from_payload("push", &payload.to_string()).expect("valid payload")
}
