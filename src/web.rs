//! Shared HTTP plumbing and the webpage fetcher used for backfilling.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use tracing::{debug, error, warn};

use crate::error::HttpError;
use crate::extract::extract_text_bytes;

/// Time allowed to establish a connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Time allowed for a whole request/response exchange.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Diagnostic bodies are cut to this many characters before logging.
pub const LOG_BODY_LIMIT: usize = 200;

const USER_AGENT: &str = concat!("newsblur-digest/", env!("CARGO_PKG_VERSION"));

/// Build a blocking client with the standard timeouts.
///
/// `cookies` enables a per-client cookie jar; that jar *is* the NewsBlur
/// session, so every login gets a fresh client.
pub fn build_client(cookies: bool, timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .cookie_store(cookies)
        .build()
}

/// Send `request` and insist on a 200.
pub fn send_ok(request: RequestBuilder) -> Result<Response, HttpError> {
    let response = request.send()?;
    if response.status() != reqwest::StatusCode::OK {
        return Err(HttpError::Status(response.status()));
    }
    Ok(response)
}

/// Trait for anything that can turn a URL into readable page text.
///
/// The story fetcher calls this at most once per thin story.
pub trait PageFetcher {
    /// `None` means "no content": failed request, non-200, or a page with no
    /// visible text.
    fn fetch_text(&self, url: &str) -> Option<String>;
}

/// [`PageFetcher`] that performs a plain GET.
pub struct WebPageFetcher {
    client: Client,
}

impl WebPageFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl PageFetcher for WebPageFetcher {
    fn fetch_text(&self, url: &str) -> Option<String> {
        debug!(%url, "fetching page");
        let body = match send_ok(self.client.get(url)).and_then(|r| Ok(r.bytes()?)) {
            Ok(body) => body,
            Err(HttpError::Status(status)) => {
                error!(%url, %status, "failed to fetch page content");
                return None;
            }
            Err(e) => {
                error!(%url, error = %e, "request for page content failed");
                return None;
            }
        };

        let text = extract_text_bytes(&body);
        if text.is_empty() {
            warn!(%url, "page had no extractable text");
            return None;
        }
        Some(text)
    }
}
