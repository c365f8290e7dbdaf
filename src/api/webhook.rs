//! Webhook handler for GitHub issue typing events

use axum::{
    Json,
    body::Bytes,
    extract::State as AxumState,
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
};
use serde::Serialize;
use serde_json::Value;
use tracing::{Instrument, debug, error, info, info_span};
use uuid::Uuid;

use crate::SharedState;
use crate::destination::resolve_destination;
use crate::error::{RelayError, Result};
use crate::notification::build_message;
use crate::webhook::{
    ISSUES_EVENT, IssueEvent, TYPED_ACTION, X_GITHUB_DELIVERY, X_GITHUB_EVENT, payload_action,
    payload_issue_number, payload_repository,
};

pub const NOT_JSON_MESSAGE: &str = "Content type must be application/json";
pub const SENT_MESSAGE: &str = "Notification sent";
pub const FAILED_MESSAGE: &str = "Failed to send notification";

/// Summary returned to GitHub for every webhook request.
#[derive(Debug, Serialize, PartialEq)]
pub struct WebhookResponse {
    pub message: String,
    pub status_code: Option<u16>,
    pub issue_number: Option<u64>,
    pub repository: Option<String>,
}

impl WebhookResponse {
    fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: None,
            issue_number: None,
            repository: None,
        }
    }

    fn for_event(message: impl Into<String>, event: &IssueEvent, status_code: Option<u16>) -> Self {
        Self {
            message: message.into(),
            status_code,
            issue_number: Some(event.issue.number),
            repository: Some(event.repository.full_name.clone()),
        }
    }
}

/// Why a well-formed request was acknowledged without forwarding anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    UnhandledEventKind,
    UnhandledAction,
}

impl IgnoreReason {
    pub fn message(self) -> &'static str {
        match self {
            IgnoreReason::UnhandledEventKind => "Not an issue event",
            IgnoreReason::UnhandledAction => "Not an issue typing event",
        }
    }
}

type Reply = (StatusCode, Json<WebhookResponse>);

/// Handles the GitHub webhook POST request.
pub async fn handle_webhook(
    AxumState(state): AxumState<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Reply {
    let event_kind = header_str(&headers, X_GITHUB_EVENT).map(String::from);
    let delivery_id = header_str(&headers, X_GITHUB_DELIVERY)
        .map(String::from)
        .unwrap_or_else(|| Uuid::now_v7().to_string());

    let span = info_span!("webhook", delivery_id = %delivery_id, event = ?event_kind);
    let (status, response) = process(&state, &headers, event_kind.as_deref(), &body)
        .instrument(span)
        .await;
    (status, Json(response))
}

async fn process(
    state: &SharedState,
    headers: &HeaderMap,
    event_kind: Option<&str>,
    body: &[u8],
) -> (StatusCode, WebhookResponse) {
    info!(
        "Received GitHub webhook - Event: {:?}, Content-Type: {:?}",
        event_kind,
        header_str(headers, CONTENT_TYPE.as_str())
    );

    let payload = match parse_json_body(headers, body) {
        Ok(payload) => payload,
        Err(e) => {
            error!("Request is not JSON: {}", e);
            return (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                WebhookResponse::message(NOT_JSON_MESSAGE),
            );
        }
    };

    let action = payload_action(&payload);
    info!("Received webhook action: {:?}", action);

    if event_kind != Some(ISSUES_EVENT) {
        info!("Skipping non-issue event: {:?}", event_kind);
        return ignored(IgnoreReason::UnhandledEventKind);
    }
    if action != Some(TYPED_ACTION) {
        info!("Skipping issue event with action: {:?}", action);
        return ignored(IgnoreReason::UnhandledAction);
    }

    let issue_number = payload_issue_number(&payload);
    let repository = payload_repository(&payload).map(String::from);
    let event = match IssueEvent::from_payload(payload) {
        Ok(event) => event,
        Err(e) => {
            error!("Failed to process webhook data: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                WebhookResponse {
                    message: e.to_string(),
                    status_code: None,
                    issue_number,
                    repository,
                },
            );
        }
    };
    info!(
        "Processing typed issue #{} from {}",
        event.issue.number, event.repository.full_name
    );

    let destination = resolve_destination(event.issue_type.as_ref());
    let embed = build_message(&event);

    let delivery = match state.config.webhooks.url_for(destination) {
        Some(url) => state.discord.deliver(url, embed).await,
        None => Err(RelayError::DestinationNotConfigured(destination)),
    };

    let (status, response) = match delivery {
        Ok(code) => (
            StatusCode::OK,
            WebhookResponse::for_event(SENT_MESSAGE, &event, Some(code)),
        ),
        Err(e) => {
            error!("Delivery to {} webhook failed: {}", destination, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                WebhookResponse::for_event(FAILED_MESSAGE, &event, e.upstream_status()),
            )
        }
    };
    info!("Webhook processing complete: {:?}", response);
    (status, response)
}

fn ignored(reason: IgnoreReason) -> (StatusCode, WebhookResponse) {
    (StatusCode::OK, WebhookResponse::message(reason.message()))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// `application/json` or any `application/*+json` media type, parameters ignored.
fn is_json_content_type(value: &str) -> bool {
    let mime = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

fn parse_json_body(headers: &HeaderMap, body: &[u8]) -> Result<Value> {
    let content_type = header_str(headers, CONTENT_TYPE.as_str()).unwrap_or_default();
    if !is_json_content_type(content_type) {
        return Err(RelayError::MalformedRequest(format!(
            "unsupported content type {:?}",
            content_type
        )));
    }

    let payload: Value = serde_json::from_slice(body)
        .map_err(|e| RelayError::MalformedRequest(format!("invalid JSON body: {}", e)))?;
    debug!("{:#?}", &payload);

    if !payload.is_object() {
        return Err(RelayError::MalformedRequest(
            "JSON body is not an object".to_string(),
        ));
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn json_headers(content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers
    }

    #[test]
    fn recognises_json_media_types() {
        assert!(is_json_content_type("application/json"));
        assert!(is_json_content_type("Application/JSON; charset=utf-8"));
        assert!(is_json_content_type("application/vnd.github+json"));
        assert!(!is_json_content_type("application/x-www-form-urlencoded"));
        assert!(!is_json_content_type("text/json+plain"));
        assert!(!is_json_content_type(""));
    }

    #[test]
    fn body_must_be_a_json_object() {
        let headers = json_headers("application/json");
        assert!(parse_json_body(&headers, br#"{"action":"typed"}"#).is_ok());
        assert!(matches!(
            parse_json_body(&headers, b"[1, 2]"),
            Err(RelayError::MalformedRequest(_))
        ));
        assert!(matches!(
            parse_json_body(&headers, b"{not json"),
            Err(RelayError::MalformedRequest(_))
        ));
    }

    #[test]
    fn form_payloads_are_rejected() {
        let headers = json_headers("application/x-www-form-urlencoded");
        assert!(parse_json_body(&headers, br#"{"action":"typed"}"#).is_err());
        assert!(parse_json_body(&HeaderMap::new(), br#"{}"#).is_err());
    }

    #[test]
    fn ignore_reasons_have_stable_messages() {
        assert_eq!(IgnoreReason::UnhandledEventKind.message(), "Not an issue event");
        assert_eq!(
            IgnoreReason::UnhandledAction.message(),
            "Not an issue typing event"
        );
    }
}
