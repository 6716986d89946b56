//! Slack-compatible incoming-webhook notifier.

use reqwest::blocking::Client;
use serde::Serialize;
use tracing::{error, info};

use crate::extract::truncate_chars;
use crate::web::LOG_BODY_LIMIT;

const PREAMBLE: &str = "Here is the latest summarized news:";

/// What happened to a digest handed to a [`Notifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The webhook accepted it.
    Sent,
    /// No destination configured; nothing was sent.
    Skipped,
    /// The webhook refused it or could not be reached.
    Failed,
}

pub trait Notifier {
    /// Deliver `digest`. Never fails loudly; the outcome is reported instead.
    fn notify(&self, digest: &str) -> Delivery;
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SlackPayload {
    pub text: String,
    pub unfurl_links: bool,
    pub unfurl_media: bool,
}

/// Build the webhook body for `digest`. Link and media previews are off so a
/// digest full of links does not explode into a wall of cards.
pub fn slack_payload(digest: &str) -> SlackPayload {
    SlackPayload {
        text: format!("{PREAMBLE}\n\n{digest}"),
        unfurl_links: false,
        unfurl_media: false,
    }
}

pub struct SlackWebhook {
    client: Client,
    url: Option<String>,
}

impl SlackWebhook {
    pub fn new(client: Client, url: Option<String>) -> Self {
        Self { client, url }
    }
}

impl Notifier for SlackWebhook {
    fn notify(&self, digest: &str) -> Delivery {
        let Some(url) = self.url.as_deref() else {
            info!("no webhook URL configured, skipping notification");
            return Delivery::Skipped;
        };

        let request = self.client.post(url).json(&slack_payload(digest));
        match request.send() {
            Ok(response) if response.status() == reqwest::StatusCode::OK => {
                info!("digest posted to webhook");
                Delivery::Sent
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().unwrap_or_default();
                error!(
                    %status,
                    body = %truncate_chars(&body, LOG_BODY_LIMIT),
                    "webhook rejected the digest"
                );
                Delivery::Failed
            }
            Err(e) => {
                error!(error = %e, "webhook request failed");
                Delivery::Failed
            }
        }
    }
}
