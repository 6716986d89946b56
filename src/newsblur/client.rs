//! NewsBlur REST client.
//!
//! The session is a cookie-bearing [`reqwest::blocking::Client`]: NewsBlur
//! sets `newsblur_sessionid` on a successful login and every later request
//! rides on that cookie. Response parsing lives in free functions
//! ([`parse_feeds`], [`parse_stories`], [`login_accepted`]) so it can be tested
//! without a server.

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{error, info, warn};

use super::stories::{prepare_stories, RawStory, StoryLimits};
use super::{Feed, FeedService, Story};
use crate::error::HttpError;
use crate::web::{build_client, send_ok, PageFetcher, REQUEST_TIMEOUT};

/// NewsBlur's mark-as-read endpoint ignores hashes past the fifth, so hashes
/// are sent in batches of this size.
pub const MARK_READ_BATCH: usize = 5;

/// An authenticated NewsBlur session.
pub struct Session {
    client: Client,
}

/// [`FeedService`] backed by the NewsBlur API.
pub struct NewsBlur {
    base_url: String,
    limits: StoryLimits,
    pages: Box<dyn PageFetcher>,
}

impl NewsBlur {
    /// # Arguments
    ///
    /// * `base_url` — API host, e.g. `https://newsblur.com`.
    /// * `limits` — per-feed story caps applied by [`FeedService::unread_stories`].
    /// * `pages` — used to backfill thin story bodies.
    pub fn new(base_url: impl Into<String>, limits: StoryLimits, pages: Box<dyn PageFetcher>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            limits,
            pages,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn mark_batch(&self, session: &Session, hashes: &[&str]) -> Result<(), HttpError> {
        let form: Vec<(&str, &str)> = hashes.iter().map(|h| ("story_hash", *h)).collect();
        send_ok(
            session
                .client
                .post(self.url("/reader/mark_story_hashes_as_read"))
                .form(&form),
        )?;
        Ok(())
    }
}

impl FeedService for NewsBlur {
    type Session = Session;

    fn authenticate(&self, username: &str, password: &str) -> Option<Session> {
        let client = match build_client(true, REQUEST_TIMEOUT) {
            Ok(c) => c,
            Err(e) => {
                error!(error = %e, "could not build HTTP client for login");
                return None;
            }
        };

        let request = client
            .post(self.url("/api/login"))
            .form(&[("username", username), ("password", password)]);

        let body = match send_ok(request).and_then(|r| Ok(r.text()?)) {
            Ok(body) => body,
            Err(HttpError::Status(status)) => {
                error!(%status, "authentication failed");
                return None;
            }
            Err(e) => {
                error!(error = %e, "authentication request failed");
                return None;
            }
        };

        if !login_accepted(&body) {
            error!("authentication rejected: credentials not accepted");
            return None;
        }

        Some(Session { client })
    }

    fn feeds(&self, session: &Session) -> Option<Vec<Feed>> {
        let result = send_ok(session.client.get(self.url("/reader/feeds")))
            .and_then(|r| Ok(r.text()?))
            .and_then(|body| Ok(parse_feeds(&body)?));

        match result {
            Ok(feeds) => Some(feeds),
            Err(HttpError::Status(status)) => {
                error!(%status, "failed to fetch feeds");
                None
            }
            Err(HttpError::Malformed(e)) => {
                error!(error = %e, "feed list response was not valid JSON");
                None
            }
            Err(e) => {
                error!(error = %e, "feed list request failed");
                None
            }
        }
    }

    fn unread_stories(&self, session: &Session, feed: &Feed) -> Option<Vec<Story>> {
        let request = session
            .client
            .get(self.url(&format!("/reader/feed/{}", feed.id)))
            .query(&[("read_filter", "unread")]);

        let result = send_ok(request)
            .and_then(|r| Ok(r.text()?))
            .and_then(|body| Ok(parse_stories(&body)?));

        let raw = match result {
            Ok(raw) => raw,
            Err(HttpError::Status(status)) => {
                error!(feed_id = %feed.id, %status, "failed to fetch stories");
                return None;
            }
            Err(HttpError::Malformed(e)) => {
                error!(feed_id = %feed.id, error = %e, "story response was not valid JSON");
                return None;
            }
            Err(e) => {
                error!(feed_id = %feed.id, error = %e, "story request failed");
                return None;
            }
        };

        info!(feed_id = %feed.id, feed_title = %feed.title, count = raw.len(), "stories found");
        if raw.is_empty() {
            return Some(Vec::new());
        }

        Some(prepare_stories(raw, self.pages.as_ref(), self.limits))
    }

    fn mark_read(&self, session: &Session, feeds: &[Feed]) -> usize {
        let mut marked = 0;
        for feed in feeds {
            for batch in hash_batches(feed) {
                match self.mark_batch(session, &batch) {
                    Ok(()) => {
                        info!(feed_id = %feed.id, count = batch.len(), "marked stories as read");
                        marked += batch.len();
                    }
                    Err(HttpError::Status(status)) => {
                        error!(feed_id = %feed.id, %status, "failed to mark stories as read");
                    }
                    Err(e) => {
                        error!(feed_id = %feed.id, error = %e, "mark-as-read request failed");
                    }
                }
            }
        }
        marked
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct FeedsResponse {
    #[serde(default)]
    feeds: Map<String, Value>,
}

#[derive(Deserialize)]
struct StoriesResponse {
    #[serde(default)]
    stories: Option<Vec<RawStory>>,
}

#[derive(Deserialize)]
struct LoginResponse {
    authenticated: Option<bool>,
}

/// `false` only when the body explicitly says `"authenticated": false`.
///
/// NewsBlur answers wrong credentials with a 200 and that flag.
pub fn login_accepted(body: &str) -> bool {
    match serde_json::from_str::<LoginResponse>(body) {
        Ok(resp) => resp.authenticated != Some(false),
        Err(_) => {
            warn!("login response was not JSON; trusting the 200 status");
            true
        }
    }
}

/// Parse `/reader/feeds` into feeds, keeping upstream key order.
pub fn parse_feeds(body: &str) -> Result<Vec<Feed>, serde_json::Error> {
    let resp: FeedsResponse = serde_json::from_str(body)?;
    Ok(resp
        .feeds
        .into_iter()
        .map(|(id, data)| {
            let title = data
                .get("feed_title")
                .and_then(Value::as_str)
                .unwrap_or_default();
            Feed::new(id, title)
        })
        .collect())
}

/// Parse `/reader/feed/{id}` into raw stories.
pub fn parse_stories(body: &str) -> Result<Vec<RawStory>, serde_json::Error> {
    let resp: StoriesResponse = serde_json::from_str(body)?;
    Ok(resp.stories.unwrap_or_default())
}

/// One feed's story hashes grouped into mark-read batches.
pub fn hash_batches(feed: &Feed) -> impl Iterator<Item = Vec<&str>> {
    feed.stories
        .chunks(MARK_READ_BATCH)
        .map(|chunk| chunk.iter().map(Story::hash).collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    struct NoPages;

    impl PageFetcher for NoPages {
        fn fetch_text(&self, _url: &str) -> Option<String> {
            None
        }
    }

    fn story(hash: &str) -> Story {
        Story::new(hash, "t", "c", None)
    }

    #[test]
    fn parse_feeds_extracts_ids_and_titles_in_order() {
        let body = r#"{"feeds": {
            "9": {"feed_title": "Tech", "ps": 3},
            "2": {"feed_title": "News"},
            "5": {"nt": 1}
        }}"#;
        let feeds = parse_feeds(body).unwrap();

        let ids: Vec<_> = feeds.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["9", "2", "5"]);
        assert_eq!(feeds[0].title, "Tech");
        assert_eq!(feeds[1].title, "News");
        assert_eq!(feeds[2].title, "", "missing title defaults to empty");
        assert!(feeds.iter().all(|f| f.stories.is_empty()));
    }

    #[test]
    fn parse_feeds_empty_and_missing() {
        assert!(parse_feeds(r#"{"feeds": {}}"#).unwrap().is_empty());
        assert!(parse_feeds(r#"{"authenticated": true}"#).unwrap().is_empty());
    }

    #[test]
    fn parse_feeds_rejects_garbage() {
        assert!(parse_feeds("<html>maintenance</html>").is_err());
        assert!(parse_feeds(r#"{"feeds": [1, 2]}"#).is_err());
    }

    #[test]
    fn parse_stories_reads_fields_and_nulls() {
        let body = r#"{"stories": [
            {"story_hash": "1:a", "story_title": "A", "story_content": "<p>x</p>",
             "story_permalink": "https://example.com/a", "story_date": "2024-01-01"},
            {"story_hash": "1:b", "story_title": null, "story_content": null}
        ]}"#;
        let stories = parse_stories(body).unwrap();

        assert_eq!(stories.len(), 2);
        assert_eq!(stories[0].story_hash.as_deref(), Some("1:a"));
        assert_eq!(stories[0].story_permalink.as_deref(), Some("https://example.com/a"));
        assert_eq!(stories[1].story_title, None);
        assert_eq!(stories[1].story_content, None);
        assert_eq!(stories[1].story_permalink, None);
    }

    #[test]
    fn parse_stories_empty_missing_and_null() {
        assert!(parse_stories(r#"{"stories": []}"#).unwrap().is_empty());
        assert!(parse_stories(r#"{}"#).unwrap().is_empty());
        assert!(parse_stories(r#"{"stories": null}"#).unwrap().is_empty());
        assert!(parse_stories("not json").is_err());
    }

    #[test]
    fn login_flag_is_respected() {
        assert!(login_accepted(r#"{"authenticated": true, "code": 1}"#));
        assert!(!login_accepted(r#"{"authenticated": false, "errors": {"__all__": ["nope"]}}"#));
        assert!(login_accepted(r#"{"code": 1}"#));
        assert!(login_accepted(""));
    }

    #[test]
    fn hash_batches_chunk_by_five() {
        let mut feed = Feed::new("1", "X");
        feed.stories = (0..7).map(|i| story(&format!("h{i}"))).collect();

        let batches: Vec<_> = hash_batches(&feed).collect();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0], ["h0", "h1", "h2", "h3", "h4"]);
        assert_eq!(batches[1], ["h5", "h6"]);
    }

    #[test]
    fn hash_batches_small_and_empty_feeds() {
        let mut feed = Feed::new("1", "X");
        assert_eq!(hash_batches(&feed).count(), 0);

        feed.stories = vec![story("h1"), story("h2")];
        let batches: Vec<_> = hash_batches(&feed).collect();
        assert_eq!(batches, vec![vec!["h1", "h2"]]);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let limits = StoryLimits {
            max_stories: 5,
            max_content_length: 3000,
        };
        let service = NewsBlur::new("https://newsblur.test/", limits, Box::new(NoPages));
        assert_eq!(service.url("/reader/feeds"), "https://newsblur.test/reader/feeds");
    }

    #[test]
    fn unreachable_service_fails_closed() {
        let limits = StoryLimits {
            max_stories: 5,
            max_content_length: 3000,
        };
        let service = NewsBlur::new("http://127.0.0.1:9", limits, Box::new(NoPages));
        assert!(service.authenticate("u", "p").is_none());
    }

    // -- HTTP paths against a canned server ---------------------------------

    use crate::test_server::TestServer;

    const LIMITS: StoryLimits = StoryLimits {
        max_stories: 5,
        max_content_length: 3000,
    };

    fn service_at(server: &TestServer) -> NewsBlur {
        NewsBlur::new(server.base_url.clone(), LIMITS, Box::new(NoPages))
    }

    fn session() -> Session {
        Session {
            client: build_client(true, REQUEST_TIMEOUT).unwrap(),
        }
    }

    #[test]
    fn login_posts_credentials_and_returns_session() {
        let server = TestServer::start(&[(200, r#"{"authenticated": true, "code": 1}"#)]);
        assert!(service_at(&server).authenticate("alice", "hunter2").is_some());

        let reqs = server.requests();
        assert_eq!(reqs.len(), 1);
        assert!(reqs[0].request_line.starts_with("POST /api/login "));
        assert!(reqs[0].body.contains("username=alice"));
        assert!(reqs[0].body.contains("password=hunter2"));
    }

    #[test]
    fn login_non_200_is_no_session() {
        let server = TestServer::start(&[(403, "{}")]);
        assert!(service_at(&server).authenticate("u", "p").is_none());
    }

    #[test]
    fn login_200_with_authenticated_false_is_no_session() {
        let server = TestServer::start(&[(
            200,
            r#"{"authenticated": false, "errors": {"__all__": ["Whoopsy-daisy."]}}"#,
        )]);
        assert!(service_at(&server).authenticate("u", "wrong").is_none());
    }

    #[test]
    fn feeds_200_are_parsed() {
        let server = TestServer::start(&[(
            200,
            r#"{"feeds": {"1": {"feed_title": "Tech"}, "2": {"feed_title": "News"}}}"#,
        )]);
        let feeds = service_at(&server).feeds(&session()).unwrap();

        let titles: Vec<_> = feeds.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, ["Tech", "News"]);
        assert!(server.requests()[0].request_line.starts_with("GET /reader/feeds "));
    }

    #[test]
    fn feeds_non_200_is_none() {
        let server = TestServer::start(&[(500, "")]);
        assert!(service_at(&server).feeds(&session()).is_none());
    }

    #[test]
    fn feeds_bad_json_is_none() {
        let server = TestServer::start(&[(200, "<html>maintenance</html>")]);
        assert!(service_at(&server).feeds(&session()).is_none());
    }

    #[test]
    fn feeds_empty_mapping_is_empty_list() {
        let server = TestServer::start(&[(200, r#"{"feeds": {}}"#)]);
        assert_eq!(service_at(&server).feeds(&session()), Some(Vec::new()));
    }

    #[test]
    fn stories_non_200_is_none() {
        let server = TestServer::start(&[(503, "")]);
        let feed = Feed::new("7", "Site");
        assert!(service_at(&server).unread_stories(&session(), &feed).is_none());
    }

    #[test]
    fn stories_bad_json_is_none() {
        let server = TestServer::start(&[(200, "oops")]);
        let feed = Feed::new("7", "Site");
        assert!(service_at(&server).unread_stories(&session(), &feed).is_none());
    }

    #[test]
    fn stories_empty_is_some_empty_and_asks_for_unread() {
        let server = TestServer::start(&[(200, r#"{"stories": []}"#)]);
        let feed = Feed::new("7", "Site");
        assert_eq!(
            service_at(&server).unread_stories(&session(), &feed),
            Some(Vec::new())
        );
        let line = &server.requests()[0].request_line;
        assert!(line.starts_with("GET /reader/feed/7?read_filter=unread "), "{line}");
    }

    #[test]
    fn stories_are_prepared() {
        let body = format!(
            r#"{{"stories": [{{"story_hash": "7:a", "story_title": "A",
                "story_content": "<p>{}</p>", "story_permalink": "https://x/a"}}]}}"#,
            "x".repeat(3050)
        );
        let server = TestServer::start(&[(200, body.as_str())]);
        let stories = service_at(&server)
            .unread_stories(&session(), &Feed::new("7", "Site"))
            .unwrap();

        assert_eq!(stories.len(), 1);
        assert_eq!(stories[0].hash(), "7:a");
        assert_eq!(stories[0].content().chars().count(), 3000);
    }

    #[test]
    fn mark_read_failure_does_not_stop_later_feeds() {
        let server = TestServer::start(&[(500, ""), (200, "{}")]);
        let mut first = Feed::new("1", "A");
        first.stories = vec![story("h1")];
        let mut second = Feed::new("2", "B");
        second.stories = vec![story("h2")];

        let marked = service_at(&server).mark_read(&session(), &[first, second]);

        assert_eq!(marked, 1);
        let reqs = server.requests();
        assert_eq!(reqs.len(), 2);
        assert!(reqs[0].request_line.starts_with("POST /reader/mark_story_hashes_as_read "));
        assert_eq!(reqs[0].body, "story_hash=h1");
        assert_eq!(reqs[1].body, "story_hash=h2");
    }

    #[test]
    fn mark_read_sends_at_most_five_hashes_per_call() {
        let server = TestServer::start(&[(200, "{}"), (200, "{}")]);
        let mut feed = Feed::new("1", "A");
        feed.stories = (0..7).map(|i| story(&format!("h{i}"))).collect();

        let marked = service_at(&server).mark_read(&session(), &[feed]);

        assert_eq!(marked, 7);
        let reqs = server.requests();
        assert_eq!(reqs.len(), 2);
        assert_eq!(reqs[0].body.matches("story_hash=").count(), 5);
        assert_eq!(reqs[1].body, "story_hash=h5&story_hash=h6");
    }
}
