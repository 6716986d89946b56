//! Error types shared by the pipeline stages.
//!
//! Stages never bubble these up to the orchestrator: each one matches on the
//! error, logs the case, and hands back its "no result" sentinel. The types
//! exist so that "the request never got an answer", "the answer was not 200"
//! and "the answer was garbage" are told apart in logs.

use reqwest::StatusCode;
use thiserror::Error;

/// A required environment value is missing or unusable.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Variable absent or empty.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// Variable present but could not be parsed.
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Failure of a single HTTP exchange.
#[derive(Error, Debug)]
pub enum HttpError {
    /// Connection refused, DNS failure, timeout, etc.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with something other than 200.
    #[error("unexpected status {0}")]
    Status(StatusCode),

    /// The body could not be parsed.
    #[error("malformed response body: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Failure of the summarization call.
#[derive(Error, Debug)]
pub enum SummarizeError {
    #[error("summarization request failed: {0}")]
    Http(#[from] HttpError),

    #[error("summarization response has no choices")]
    NoChoices,
}

impl From<reqwest::Error> for SummarizeError {
    fn from(e: reqwest::Error) -> Self {
        SummarizeError::Http(HttpError::Transport(e))
    }
}

impl From<serde_json::Error> for SummarizeError {
    fn from(e: serde_json::Error) -> Self {
        SummarizeError::Http(HttpError::Malformed(e))
    }
}
