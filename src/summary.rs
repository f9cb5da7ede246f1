//! Summary types - what the summarisation service returns, and what we send it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown style '{0}' (expected executive, detailed, bullet_points or academic)")]
pub struct UnknownStyle(pub String);

/// Tone/format preference sent with a summarise request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    #[default]
    Executive,
    Detailed,
    BulletPoints,
    Academic,
}

impl Style {
    /// All styles in selector order
    pub const ALL: [Style; 4] = [
        Style::Executive,
        Style::Detailed,
        Style::BulletPoints,
        Style::Academic,
    ];

    /// Wire name of the style
    pub fn as_str(self) -> &'static str {
        match self {
            Style::Executive => "executive",
            Style::Detailed => "detailed",
            Style::BulletPoints => "bullet_points",
            Style::Academic => "academic",
        }
    }

    /// Human label for the selector
    pub fn label(self) -> &'static str {
        match self {
            Style::Executive => "Executive",
            Style::Detailed => "Detailed",
            Style::BulletPoints => "Bullet points",
            Style::Academic => "Academic",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    /// Next style, wrapping around
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Previous style, wrapping around
    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Style {
    type Err = UnknownStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|style| style.as_str() == normalized)
            .ok_or_else(|| UnknownStyle(s.to_string()))
    }
}

/// Kind of content the service summarised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Article,
    Youtube,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentType::Article => f.write_str("article"),
            ContentType::Youtube => f.write_str("YouTube video"),
        }
    }
}

/// The summary shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    /// Main summary paragraph
    pub summary: String,
    /// Key insights, in the order the service returned them
    pub key_insights: Vec<String>,
    /// What kind of content was summarised
    pub content_type: ContentType,
}

/// One question/answer pair of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub question: String,
    pub answer: String,
}

/// Body of `POST /summarize`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummarizeRequest {
    pub url: String,
    pub style: Style,
}

/// Successful `POST /summarize` response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SummarizeResponse {
    pub summary: String,
    pub key_insights: Vec<String>,
    pub content_type: ContentType,
    pub session_id: String,
}

impl SummarizeResponse {
    /// Split into the displayed result and the session id
    pub fn into_parts(self) -> (SummaryResult, String) {
        (
            SummaryResult {
                summary: self.summary,
                key_insights: self.key_insights,
                content_type: self.content_type,
            },
            self.session_id,
        )
    }
}

/// Body of `POST /ask`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AskRequest {
    pub session_id: String,
    pub question: String,
}

/// Successful `POST /ask` response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AskResponse {
    pub conversation_history: Vec<Exchange>,
}

/// Liveness response from `GET /`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusResponse {
    pub message: String,
}
