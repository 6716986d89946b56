//! newsblur-digest — summarize unread NewsBlur stories and post them to Slack.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌────────────┐ Feed/Story ┌────────────┐ ChatRequest ┌────────────┐
//! │ newsblur/  │ ─────────► │ pipeline   │ ──────────► │ openai     │
//! │ (service)  │ ◄───────── │ (run)      │ ◄────────── │ (summary)  │
//! └────────────┘ mark read  └────────────┘   digest    └────────────┘
//!       │                         │
//!       │ PageFetcher             │ notify()
//!       ▼                         ▼
//! ┌────────────┐            ┌────────────┐
//! │ web        │            │ slack      │
//! │ (backfill) │            │ (webhook)  │
//! └────────────┘            └────────────┘
//! ```
//!
//! * **`newsblur/`** — the `FeedService` trait, `Feed`/`Story`, the NewsBlur
//!   client, and the story cap/backfill/truncate policy.
//! * **`web`** — HTTP client construction and the page fetcher.
//! * **`extract`** — HTML to plain text.
//! * **`digest`** — prompt construction and the `Summarizer` trait.
//! * **`openai`** / **`slack`** — the two outbound integrations.
//! * **`pipeline`** — the run itself, one early return per stage.
//! * **`main`** — load config, build collaborators, run once.

mod config;
mod digest;
mod error;
mod extract;
mod logging;
mod newsblur;
mod openai;
mod pipeline;
mod slack;
#[cfg(test)]
mod test_server;
mod web;

use anyhow::Result;
use tracing::info;

use config::Config;
use newsblur::stories::StoryLimits;
use newsblur::NewsBlur;
use openai::{OpenAiClient, SUMMARIZE_TIMEOUT};
use pipeline::{Pipeline, RunSettings};
use slack::SlackWebhook;
use web::{build_client, WebPageFetcher, REQUEST_TIMEOUT};

fn main() -> Result<()> {
    // A missing .env is normal in production.
    dotenv::dotenv().ok();
    logging::init(std::env::var("LOG_LEVEL").ok().as_deref());

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            info!(error = %e, "configuration incomplete, nothing to do");
            return Ok(());
        }
    };

    let service = NewsBlur::new(
        config.newsblur_base_url.clone(),
        StoryLimits {
            max_stories: config.max_stories,
            max_content_length: config.max_content_length,
        },
        Box::new(WebPageFetcher::new(build_client(false, REQUEST_TIMEOUT)?)),
    );
    let summarizer = OpenAiClient::new(
        build_client(false, SUMMARIZE_TIMEOUT)?,
        config.openai_base_url.clone(),
        config.openai_api_key.clone(),
    );
    let notifier = SlackWebhook::new(
        build_client(false, REQUEST_TIMEOUT)?,
        config.slack_webhook_url.clone(),
    );

    let settings = RunSettings {
        username: config.newsblur_username,
        password: config.newsblur_password,
        model_id: config.model_id,
        mark_stories_as_read: config.mark_stories_as_read,
    };

    let outcome = Pipeline::new(&service, &summarizer, &notifier, settings).run();
    info!(?outcome, "run finished");
    Ok(())
}
