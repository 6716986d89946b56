//! Feed-service abstraction layer.
//!
//! This module defines the [`FeedService`] trait and the [`Feed`] / [`Story`]
//! types. The only implementation is [`NewsBlur`], which speaks the NewsBlur
//! REST API; the pipeline only ever talks to the trait, so tests drive it
//! with an in-memory service.
//!
//! ## For contributors — supporting another reader service
//!
//! 1. Create a new file in `src/` (e.g. `miniflux.rs`).
//! 2. Pick a session type (token, cookie jar, …) and implement
//!    [`FeedService`] for your client struct.
//! 3. Reuse [`stories::prepare_stories`] so the cap/backfill/truncate
//!    policy stays identical across services.
//! 4. Construct it in `main.rs` instead of [`NewsBlur`].

mod client;
mod models;
pub mod stories;

pub use client::NewsBlur;
pub use models::{Feed, Story};

/// Everything the pipeline needs from the feed-reading service.
///
/// Every method logs its own failures and answers with a sentinel instead of
/// an error: `None` means "this stage failed", an empty `Vec` means "this
/// stage worked and found nothing".
pub trait FeedService {
    /// Whatever proves we are logged in. Threaded through every later call.
    type Session;

    /// Exchange credentials for a session. No retry.
    fn authenticate(&self, username: &str, password: &str) -> Option<Self::Session>;

    /// List subscribed feeds, each with an empty story list.
    fn feeds(&self, session: &Self::Session) -> Option<Vec<Feed>>;

    /// Unread stories for one feed, already cleaned, backfilled and capped.
    fn unread_stories(&self, session: &Self::Session, feed: &Feed) -> Option<Vec<Story>>;

    /// Mark every story of every feed as read.
    ///
    /// Failures are logged per call and never stop the remaining calls.
    /// Returns how many hashes the service acknowledged.
    fn mark_read(&self, session: &Self::Session, feeds: &[Feed]) -> usize;
}
