use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::clock::{Clock, SystemClock};

// ASCII word characters only: `#café` yields `#caf`.
static HASHTAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#(?-u:\w)+").unwrap());

/// Every `#word` run in `content`, lower-cased, in order of appearance.
/// Repeats are kept.
pub fn extract_hashtags(content: &str) -> Vec<String> {
    HASHTAG
        .find_iter(content)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// A geotagged post. Hashtags are extracted once, when the post is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    content: String,
    created_at: DateTime<Utc>,
    location: String,
    hashtags: Vec<String>,
}

impl Post {
    pub fn new(content: impl Into<String>, location: impl Into<String>) -> Self {
        Self::with_clock(content, location, &SystemClock)
    }

    pub fn with_clock<C: Clock>(
        content: impl Into<String>,
        location: impl Into<String>,
        clock: &C,
    ) -> Self {
        Self::at(content, location, clock.now())
    }

    pub fn at(
        content: impl Into<String>,
        location: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let content = content.into();
        let hashtags = extract_hashtags(&content);
        Self {
            content,
            created_at,
            location: location.into(),
            hashtags,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn hashtags(&self) -> &[String] {
        &self.hashtags
    }
}
