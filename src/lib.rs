pub mod api;
pub mod config;
pub mod destination;
pub mod discord;
pub mod error;
pub mod logging;
pub mod notification;
pub mod webhook;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing,
};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::error;

pub use config::{BuildInfo, RelayConfig, WebhookUrls};
pub use discord::DiscordClient;
pub use error::RelayError;

/// Read-only per-process state. Nothing here changes between requests.
pub struct AppState {
    pub config: RelayConfig,
    pub discord: DiscordClient,
}

impl AppState {
    pub fn new(config: RelayConfig) -> error::Result<Self> {
        let discord = DiscordClient::new(config.delivery_timeout())?;
        Ok(Self { config, discord })
    }
}

pub type SharedState = Arc<AppState>;

/// Builds the HTTP router: `POST /webhook` and `GET /health`.
pub fn app(state: SharedState) -> Router {
    Router::new()
        .route("/webhook", routing::post(api::handle_webhook))
        .route("/health", routing::get(api::health_check))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!("Error processing webhook: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "message": format!("Internal server error: {}", detail),
            "status_code": null,
            "issue_number": null,
            "repository": null,
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    async fn panic_reply(payload: Box<dyn Any + Send + 'static>) -> (StatusCode, Value) {
        let response = handle_panic(payload);
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn assert_internal_error(status: StatusCode, body: &Value) {
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let fields = body.as_object().unwrap();
        let mut keys: Vec<_> = fields.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["issue_number", "message", "repository", "status_code"]);
        assert_eq!(body["status_code"], Value::Null);
        assert_eq!(body["issue_number"], Value::Null);
        assert_eq!(body["repository"], Value::Null);
        assert_eq!(body["message"], "Internal server error: boom");
    }

    #[tokio::test]
    async fn static_str_panic_becomes_internal_error() {
        let (status, body) = panic_reply(Box::new("boom")).await;
        assert_internal_error(status, &body);
    }

    #[tokio::test]
    async fn string_panic_becomes_internal_error() {
        let (status, body) = panic_reply(Box::new(String::from("boom"))).await;
        assert_internal_error(status, &body);
    }

    #[tokio::test]
    async fn opaque_panic_payload_is_reported_generically() {
        let (status, body) = panic_reply(Box::new(17_u32)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error: unknown panic");
    }
}
