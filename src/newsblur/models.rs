//! The two data types that flow through the pipeline.
//!
//! A [`Feed`] is created by the feed lister with an empty story list; the
//! story-fetch stage fills [`Feed::stories`] afterwards. A [`Story`] is built
//! once by the story fetcher and never changes after that, which is why its
//! fields are private.

/// A subscribed feed and the unread stories fetched for it this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    /// Upstream feed identifier (NewsBlur sends it as an object key).
    pub id: String,

    /// Display title; empty when upstream omitted it.
    pub title: String,

    /// Stories in upstream order, at most the configured cap.
    pub stories: Vec<Story>,
}

impl Feed {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            stories: Vec::new(),
        }
    }
}

/// A single cleaned, length-capped story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    hash: String,
    title: String,
    content: String,
    permalink: Option<String>,
}

impl Story {
    pub fn new(
        hash: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        permalink: Option<String>,
    ) -> Self {
        Self {
            hash: hash.into(),
            title: title.into(),
            content: content.into(),
            permalink,
        }
    }

    /// Unique-within-feed identifier; the only field mark-read needs.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Plain-text body, already extracted and truncated.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn permalink(&self) -> Option<&str> {
        self.permalink.as_deref()
    }
}
