//! GitHub "issues" webhook payload structures

use serde::Deserialize;
use serde_json::Value;

use crate::error::{RelayError, Result};

pub const X_GITHUB_EVENT: &str = "X-GitHub-Event";
pub const X_GITHUB_DELIVERY: &str = "X-GitHub-Delivery";

/// The only event kind the relay forwards.
pub const ISSUES_EVENT: &str = "issues";
/// The only `issues` action the relay forwards.
pub const TYPED_ACTION: &str = "typed";

/// An `issues` event after an issue type was assigned.
///
/// `type` and `issue.body` are genuinely optional; every other field is
/// required and its absence rejects the event.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueEvent {
    pub action: String,
    pub issue: Issue,
    pub repository: Repository,
    #[serde(rename = "type", default)]
    pub issue_type: Option<IssueType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub html_url: String,
    pub user: IssueUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueUser {
    pub login: String,
    pub avatar_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub full_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueType {
    pub name: String,
}

impl IssueEvent {
    /// Extract a typed event from an already parsed JSON payload.
    pub fn from_payload(payload: Value) -> Result<Self> {
        serde_json::from_value(payload).map_err(|e| RelayError::MalformedEvent(e.to_string()))
    }

    /// Name of the assigned issue type, if any.
    pub fn type_name(&self) -> Option<&str> {
        self.issue_type.as_ref().map(|t| t.name.as_str())
    }
}

/// Reads the `action` field without requiring the rest of the payload to be well formed.
pub fn payload_action(payload: &Value) -> Option<&str> {
    payload.get("action").and_then(|a| a.as_str())
}

/// Reads `issue.number` leniently, for error replies on otherwise malformed events.
pub fn payload_issue_number(payload: &Value) -> Option<u64> {
    payload.pointer("/issue/number").and_then(|n| n.as_u64())
}

/// Reads `repository.full_name` leniently, for error replies on otherwise malformed events.
pub fn payload_repository(payload: &Value) -> Option<&str> {
    payload
        .pointer("/repository/full_name")
        .and_then(|n| n.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn typed_payload() -> Value {
        json!({
            "action": "typed",
            "issue": {
                "number": 42,
                "title": "Crash on start",
                "body": "Steps to reproduce",
                "html_url": "https://github.com/acme/app/issues/42",
                "user": { "login": "octocat", "avatar_url": "https://avatars.example/octocat" }
            },
            "repository": { "full_name": "acme/app" },
            "type": { "name": "Bug" }
        })
    }

    #[test]
    fn extracts_typed_event() {
        let event = IssueEvent::from_payload(typed_payload()).unwrap();
        assert_eq!(event.issue.number, 42);
        assert_eq!(event.repository.full_name, "acme/app");
        assert_eq!(event.type_name(), Some("Bug"));
    }

    #[test]
    fn type_and_body_are_optional() {
        let mut payload = typed_payload();
        payload.as_object_mut().unwrap().remove("type");
        payload["issue"].as_object_mut().unwrap().remove("body");

        let event = IssueEvent::from_payload(payload).unwrap();
        assert!(event.issue_type.is_none());
        assert!(event.issue.body.is_none());
    }

    #[test]
    fn null_type_counts_as_absent() {
        let mut payload = typed_payload();
        payload["type"] = Value::Null;
        payload["issue"]["body"] = Value::Null;

        let event = IssueEvent::from_payload(payload).unwrap();
        assert_eq!(event.type_name(), None);
        assert!(event.issue.body.is_none());
    }

    #[test]
    fn missing_required_field_is_malformed() {
        let mut payload = typed_payload();
        payload["issue"]["user"]
            .as_object_mut()
            .unwrap()
            .remove("avatar_url");

        let err = IssueEvent::from_payload(payload).unwrap_err();
        assert!(matches!(err, RelayError::MalformedEvent(ref msg) if msg.contains("avatar_url")));
    }

    #[test]
    fn type_without_name_is_malformed() {
        let mut payload = typed_payload();
        payload["type"] = json!({});

        assert!(matches!(
            IssueEvent::from_payload(payload),
            Err(RelayError::MalformedEvent(_))
        ));
    }

    #[test]
    fn missing_repository_is_malformed() {
        let mut payload = typed_payload();
        payload.as_object_mut().unwrap().remove("repository");

        let err = IssueEvent::from_payload(payload).unwrap_err();
        assert!(err.to_string().contains("repository"));
    }

    #[test]
    fn action_is_read_leniently() {
        assert_eq!(payload_action(&typed_payload()), Some("typed"));
        assert_eq!(payload_action(&json!({ "issue": {} })), None);
        assert_eq!(payload_action(&json!({ "action": 3 })), None);
    }

    #[test]
    fn summary_fields_are_read_leniently() {
        let mut payload = typed_payload();
        payload["issue"].as_object_mut().unwrap().remove("user");

        assert_eq!(payload_issue_number(&payload), Some(42));
        assert_eq!(payload_repository(&payload), Some("acme/app"));
        assert_eq!(payload_issue_number(&json!({ "issue": { "number": "42" } })), None);
        assert_eq!(payload_repository(&json!({})), None);
    }
}
