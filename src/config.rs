//! Environment-driven configuration.
//!
//! Everything is read once at startup. [`Config::from_lookup`] takes the
//! lookup as a closure so tests can feed a `HashMap` instead of touching the
//! real process environment.

use crate::error::ConfigError;

/// Default NewsBlur host.
pub const DEFAULT_NEWSBLUR_BASE_URL: &str = "https://newsblur.com";

/// Default OpenAI-compatible API root.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Stories taken from each feed per run.
pub const DEFAULT_MAX_STORIES: usize = 5;

/// Characters of story text kept per story.
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 3000;

/// Runtime configuration for one digest run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub newsblur_username: String,
    pub newsblur_password: String,
    pub newsblur_base_url: String,
    pub model_id: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    /// `None` disables notification.
    pub slack_webhook_url: Option<String>,
    pub mark_stories_as_read: bool,
    pub max_stories: usize,
    pub max_content_length: usize,
}

impl Config {
    /// Load from the process environment (after `.env`, if any, was applied).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty strings are treated exactly like unset variables.
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        Ok(Self {
            newsblur_username: require("NEWSBLUR_USERNAME")?,
            newsblur_password: require("NEWSBLUR_PASSWORD")?,
            model_id: require("MODEL_ID")?,
            openai_api_key: require("OPENAI_API_KEY")?,
            newsblur_base_url: get("NEWSBLUR_BASE_URL")
                .unwrap_or_else(|| DEFAULT_NEWSBLUR_BASE_URL.into()),
            openai_base_url: get("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.into()),
            slack_webhook_url: get("SLACK_WEBHOOK_URL"),
            mark_stories_as_read: get("MARK_STORIES_AS_READ")
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("true")),
            max_stories: parse_count("MAX_STORIES", get("MAX_STORIES"), DEFAULT_MAX_STORIES)?,
            max_content_length: parse_count(
                "MAX_CONTENT_LENGTH",
                get("MAX_CONTENT_LENGTH"),
                DEFAULT_MAX_CONTENT_LENGTH,
            )?,
        })
    }
}

fn parse_count(
    name: &'static str,
    raw: Option<String>,
    default: usize,
) -> Result<usize, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => match value.trim().parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ConfigError::Invalid { name, value }),
        },
    }
}
