//! OpenAI-compatible chat-completion client.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::digest::{ChatRequest, Summarizer};
use crate::error::SummarizeError;
use crate::web::send_ok;

/// Generation takes far longer than a page fetch.
pub const SUMMARIZE_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Posts to `{base_url}/chat/completions` with bearer auth.
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl Summarizer for OpenAiClient {
    fn summarize(&self, request: &ChatRequest) -> Result<String, SummarizeError> {
        debug!(model = %request.model, "requesting summary");
        let response = send_ok(
            self.client
                .post(self.endpoint())
                .bearer_auth(&self.api_key)
                .json(request),
        )?;
        parse_completion(&response.text()?)
    }
}

/// Pull the first choice's text out of a completion body.
///
/// A choice with `null` content yields an empty string; the pipeline treats
/// that as an empty digest rather than an error.
fn parse_completion(body: &str) -> Result<String, SummarizeError> {
    let resp: ChatResponse = serde_json::from_str(body)?;
    let choice = resp.choices.into_iter().next().ok_or(SummarizeError::NoChoices)?;
    Ok(choice.message.content.unwrap_or_default())
}
