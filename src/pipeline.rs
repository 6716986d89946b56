//! The digest run, start to finish.
//!
//! ```text
//! authenticate → list feeds → fetch stories per feed → drop empty feeds
//!              → compose digest → notify → (optional) mark read
//! ```
//!
//! Every arrow is an early return: a stage that comes back empty or failed
//! ends the run with a [`RunOutcome`] describing where it stopped. Nothing
//! here panics or returns an error; the process always exits cleanly.
//!
//! Feeds are fetched one at a time, in list order. Parallelising would be
//! easy, but then per-feed log ordering and mark-read order would need to be
//! preserved explicitly.

use tracing::{error, info};

use crate::digest::{compose_digest, Summarizer};
use crate::newsblur::{Feed, FeedService};
use crate::slack::{Delivery, Notifier};

/// Per-run switches and credentials.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub username: String,
    pub password: String,
    pub model_id: String,
    pub mark_stories_as_read: bool,
}

/// Where a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    NoSession,
    NoFeeds,
    NoStories,
    SummaryFailed,
    EmptyDigest,
    Delivered {
        delivery: Delivery,
        /// Hashes acknowledged by mark-read; `None` when mark-read did not run.
        marked: Option<usize>,
    },
}

/// One configured digest run. Collaborators are borrowed so the caller (or a
/// test) decides what they are.
pub struct Pipeline<'a, S: FeedService> {
    service: &'a S,
    summarizer: &'a dyn Summarizer,
    notifier: &'a dyn Notifier,
    settings: RunSettings,
}

impl<'a, S: FeedService> Pipeline<'a, S> {
    pub fn new(
        service: &'a S,
        summarizer: &'a dyn Summarizer,
        notifier: &'a dyn Notifier,
        settings: RunSettings,
    ) -> Self {
        Self {
            service,
            summarizer,
            notifier,
            settings,
        }
    }

    pub fn run(&self) -> RunOutcome {
        let Some(session) = self
            .service
            .authenticate(&self.settings.username, &self.settings.password)
        else {
            info!("no session, ending run");
            return RunOutcome::NoSession;
        };

        let feeds = match self.service.feeds(&session) {
            Some(feeds) if !feeds.is_empty() => feeds,
            _ => {
                info!("no feeds, ending run");
                return RunOutcome::NoFeeds;
            }
        };

        let feeds = self.fetch_all_stories(&session, feeds);
        if feeds.is_empty() {
            info!("no feed stories, ending run");
            return RunOutcome::NoStories;
        }

        let digest = match compose_digest(&feeds, &self.settings.model_id, self.summarizer) {
            Ok(digest) => digest,
            Err(e) => {
                error!(error = %e, "failed to summarize stories");
                return RunOutcome::SummaryFailed;
            }
        };
        if digest.trim().is_empty() {
            info!("summarizer returned an empty digest, ending run");
            return RunOutcome::EmptyDigest;
        }
        info!("summary:\n\n{digest}");

        let delivery = self.notifier.notify(&digest);

        let marked = if !self.settings.mark_stories_as_read {
            None
        } else if delivery == Delivery::Failed {
            info!("notification failed, leaving stories unread");
            None
        } else {
            Some(self.service.mark_read(&session, &feeds))
        };

        RunOutcome::Delivered { delivery, marked }
    }

    /// Attach stories to each feed and keep only the feeds that got some.
    fn fetch_all_stories(&self, session: &S::Session, feeds: Vec<Feed>) -> Vec<Feed> {
        feeds
            .into_iter()
            .filter_map(|mut feed| {
                feed.stories = self
                    .service
                    .unread_stories(session, &feed)
                    .unwrap_or_default();
                (!feed.stories.is_empty()).then_some(feed)
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
