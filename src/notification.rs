//! Discord embed built from a typed issue event

use serde::Serialize;

use crate::webhook::IssueEvent;

pub const MAX_DESCRIPTION_CHARS: usize = 2000;
pub const EMPTY_DESCRIPTION: &str = "No description provided";
pub const UNSPECIFIED_TYPE: &str = "Unspecified";

pub const FEATURE_COLOR: u32 = 0x2a84f8;
pub const BUG_COLOR: u32 = 0xf8412d;
pub const DEFAULT_COLOR: u32 = 5814783;

/// Body of a Discord webhook execution request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DiscordPayload {
    pub embeds: Vec<Embed>,
}

impl From<Embed> for DiscordPayload {
    fn from(embed: Embed) -> Self {
        Self {
            embeds: vec![embed],
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub url: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub thumbnail: EmbedThumbnail,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedField {
    fn inline(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
            inline: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmbedThumbnail {
    pub url: String,
}

/// Builds the notification embed for an issue that just got a type.
///
/// The color is chosen from the type name on its own, independent of which
/// channel the event is routed to: `enhancement` keeps the default color.
pub fn build_message(event: &IssueEvent) -> Embed {
    let issue = &event.issue;

    Embed {
        title: format!("New Issue: {}", issue.title),
        description: describe(issue.body.as_deref()),
        url: issue.html_url.clone(),
        color: accent_color(event.type_name()),
        fields: vec![
            EmbedField::inline("Repository", event.repository.full_name.as_str()),
            EmbedField::inline("Created by", issue.user.login.as_str()),
            EmbedField::inline("Type", event.type_name().unwrap_or(UNSPECIFIED_TYPE)),
        ],
        thumbnail: EmbedThumbnail {
            url: issue.user.avatar_url.clone(),
        },
    }
}

fn describe(body: Option<&str>) -> String {
    match body {
        Some(body) if !body.is_empty() => body.chars().take(MAX_DESCRIPTION_CHARS).collect(),
        _ => EMPTY_DESCRIPTION.to_string(),
    }
}

fn accent_color(type_name: Option<&str>) -> u32 {
    match type_name.map(str::to_lowercase).as_deref() {
        Some("feature") => FEATURE_COLOR,
        Some("bug") => BUG_COLOR,
        _ => DEFAULT_COLOR,
    }
}
