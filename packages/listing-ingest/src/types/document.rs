//! Raw and normalized page content.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unmodified page content from a successful fetch.
///
/// Consumed once by the normalizer and then dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDocument {
    /// Location that was requested
    pub url: String,

    /// Location after redirects
    pub final_url: String,

    /// HTTP status of the final response
    pub status: u16,

    /// Response body as text
    pub body: String,

    /// When the body was received
    pub fetched_at: DateTime<Utc>,
}

impl RawDocument {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            final_url: url.clone(),
            url,
            status: 200,
            body: body.into(),
            fetched_at: Utc::now(),
        }
    }

    pub fn with_final_url(mut self, final_url: impl Into<String>) -> Self {
        self.final_url = final_url.into();
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Body length in bytes.
    pub fn content_length(&self) -> usize {
        self.body.len()
    }
}

/// Ordered, non-empty, trimmed lines derived from a [`RawDocument`].
///
/// Every constructor goes through line collapsing, so the invariant holds
/// for any value of this type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct NormalizedText(String);

impl NormalizedText {
    /// Trim each line, drop empty ones, keep order.
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let kept: Vec<&str> = lines
            .into_iter()
            .flat_map(str::lines)
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        Self(kept.join("\n"))
    }

    /// Collapse arbitrary text into normalized lines.
    pub fn collapse(text: &str) -> Self {
        Self::from_lines(text.lines())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters, the unit the size limit is expressed in.
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    pub fn line_count(&self) -> usize {
        self.0.lines().count()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.0.lines()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
