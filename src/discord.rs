//! Delivers notifications to Discord webhooks using reqwest.

use reqwest::Client;
use std::time::Duration;
use tracing::{error, info};

use crate::error::{RelayError, Result};
use crate::notification::{DiscordPayload, Embed};

const MAX_LOGGED_BODY_CHARS: usize = 500;

/// Sends one embed per call. No retries.
#[derive(Debug, Clone)]
pub struct DiscordClient {
    client: Client,
}

impl DiscordClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .user_agent(concat!("issue_relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RelayError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// POST `{"embeds": [embed]}` to `url` and return the upstream status code.
    ///
    /// A non-success reply is an error carrying the status.
    pub async fn deliver(&self, url: &str, embed: Embed) -> Result<u16> {
        info!("Sending Discord notification with title: {}", embed.title);

        let response = self
            .client
            .post(url)
            .json(&DiscordPayload::from(embed))
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send Discord notification: {}", e);
                RelayError::DeliveryFailed(e)
            })?;

        let status = response.status();
        if status.is_success() {
            info!(
                "Successfully sent notification to Discord. Status code: {}",
                status.as_u16()
            );
            Ok(status.as_u16())
        } else {
            let body = response.text().await.unwrap_or_default();
            error!(
                "Discord rejected notification with status {}: {}",
                status.as_u16(),
                truncate_for_log(&body)
            );
            Err(RelayError::DeliveryRejected(status.as_u16()))
        }
    }
}

/// Cuts an upstream response body to at most `MAX_LOGGED_BODY_CHARS` characters.
fn truncate_for_log(body: &str) -> String {
    body.chars().take(MAX_LOGGED_BODY_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logged_body_is_truncated() {
        let body = "ü".repeat(MAX_LOGGED_BODY_CHARS * 4);
        let logged = truncate_for_log(&body);

        assert_eq!(logged.chars().count(), MAX_LOGGED_BODY_CHARS);
        assert!(body.starts_with(&logged));
    }

    #[test]
    fn short_body_is_logged_whole() {
        assert_eq!(truncate_for_log("rate limited"), "rate limited");
        assert_eq!(truncate_for_log(""), "");
    }
}
