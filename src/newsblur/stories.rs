//! Turning raw NewsBlur stories into [`Story`] values.
//!
//! This is the one piece of the pipeline with real policy in it:
//!
//! 1. cap the number of stories per feed,
//! 2. extract text from the story HTML,
//! 3. backfill thin bodies by scraping the permalink,
//! 4. hard-truncate to the content cap.
//!
//! Everything here is pure apart from the [`PageFetcher`] call, so tests can
//! drive it with a fake fetcher.

use serde::Deserialize;
use tracing::info;

use super::Story;
use crate::extract::{extract_text, truncate_chars};
use crate::web::PageFetcher;

/// Bodies shorter than this (in characters) count as "probably a teaser" and
/// trigger a backfill from the permalink.
pub const SHORT_CONTENT_THRESHOLD: usize = 100;

/// A story as NewsBlur returns it. Every field may be missing or `null`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct RawStory {
    #[serde(default)]
    pub story_hash: Option<String>,
    #[serde(default)]
    pub story_title: Option<String>,
    #[serde(default)]
    pub story_content: Option<String>,
    #[serde(default)]
    pub story_permalink: Option<String>,
}

/// Per-feed story caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoryLimits {
    pub max_stories: usize,
    pub max_content_length: usize,
}

/// Apply the cap/extract/backfill/truncate policy to one feed's raw stories.
///
/// Upstream order is preserved; nothing is reordered or de-duplicated.
pub fn prepare_stories(
    raw: Vec<RawStory>,
    fetcher: &dyn PageFetcher,
    limits: StoryLimits,
) -> Vec<Story> {
    raw.into_iter()
        .take(limits.max_stories)
        .map(|story| prepare_story(story, fetcher, limits.max_content_length))
        .collect()
}

fn prepare_story(raw: RawStory, fetcher: &dyn PageFetcher, max_len: usize) -> Story {
    let hash = raw.story_hash.unwrap_or_default();
    let permalink = raw.story_permalink.filter(|p| !p.trim().is_empty());

    let mut text = extract_text(raw.story_content.as_deref());

    if text.chars().count() < SHORT_CONTENT_THRESHOLD {
        if let Some(url) = permalink.as_deref() {
            info!(story_hash = %hash, "story content looks thin, fetching page directly");
            if let Some(page_text) = fetcher.fetch_text(url) {
                text = page_text;
            }
        }
    }

    Story::new(
        hash,
        raw.story_title.unwrap_or_default(),
        truncate_chars(&text, max_len),
        permalink,
    )
}
