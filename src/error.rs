use std::io;

use crate::destination::Destination;

/// Custom error type for issue_relay operations
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    #[error("No webhook URL configured for the {0} destination")]
    DestinationNotConfigured(Destination),

    #[error("Delivery failed: {0}")]
    DeliveryFailed(#[from] reqwest::Error),

    #[error("Delivery rejected with status {0}")]
    DeliveryRejected(u16),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParseError(#[from] toml::de::Error),
}

impl RelayError {
    /// Upstream HTTP status carried by this error, if the destination answered at all.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            RelayError::DeliveryRejected(code) => Some(*code),
            RelayError::DeliveryFailed(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Helper type for Results that use RelayError
pub type Result<T> = std::result::Result<T, RelayError>;
