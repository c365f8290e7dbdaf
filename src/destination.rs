//! Routing of issue types to Discord webhook destinations

use std::fmt;

use tracing::info;

use crate::config::WebhookUrls;
use crate::webhook::IssueType;

/// One of the three configured outbound endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Bug,
    Feature,
    Default,
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Destination::Bug => "bug",
            Destination::Feature => "feature",
            Destination::Default => "default",
        };
        f.write_str(name)
    }
}

/// Picks the destination for an issue type label.
///
/// Matching is case-insensitive: `bug` goes to the bug channel, `feature` and
/// `enhancement` to the feature channel, anything else (or no type) to default.
/// Whether the destination actually has a URL is checked at delivery time.
pub fn resolve_destination(issue_type: Option<&IssueType>) -> Destination {
    let Some(issue_type) = issue_type else {
        info!("No type provided, using default webhook");
        return Destination::Default;
    };

    let type_name = issue_type.name.to_lowercase();
    let destination = match type_name.as_str() {
        "bug" => Destination::Bug,
        "feature" | "enhancement" => Destination::Feature,
        _ => Destination::Default,
    };
    info!("Issue type '{}' routed to {} webhook", type_name, destination);
    destination
}

impl WebhookUrls {
    /// Returns the URL for a destination, or None when it is unset or empty.
    pub fn url_for(&self, destination: Destination) -> Option<&str> {
        let url = match destination {
            Destination::Bug => &self.bug,
            Destination::Feature => &self.feature,
            Destination::Default => &self.default,
        };
        url.as_deref().filter(|u| !u.trim().is_empty())
    }
}
