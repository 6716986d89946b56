//! Digest composition.
//!
//! Serializes the fetched feeds into one user message, pairs it with a fixed
//! system instruction, and hands the request to a [`Summarizer`].

use serde::Serialize;

use crate::error::SummarizeError;
use crate::newsblur::Feed;

/// Output budget for the model.
pub const MAX_TOKENS: u32 = 2000;

/// Moderate randomness; the digest should read naturally but stay on script.
pub const TEMPERATURE: f32 = 0.5;

pub const SYSTEM_PROMPT: &str = "\
You are an assistant that summarizes news articles.
Please ensure that every article is summarized accurately. Insert the provided
permalink for each story into the placeholder below.
The summary should be in the following format:
1. *Feed title*
  1. *Story title* - story summary (1-3 sentences) <permalink|[Read more]>
  2. *Story title* - story summary (1-3 sentences) <permalink|[Read more]>
  ..
..
2. *Feed title*
etc.
";

const USER_PREAMBLE: &str = "Please summarize the following articles.\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// A chat-completion request, shaped like the OpenAI wire format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Anything that can turn a chat request into text.
pub trait Summarizer {
    fn summarize(&self, request: &ChatRequest) -> Result<String, SummarizeError>;
}

/// Serialize feeds and stories, in input order, into the user message.
pub fn build_user_prompt(feeds: &[Feed]) -> String {
    let mut content = String::from(USER_PREAMBLE);
    for feed in feeds {
        content.push_str(&format!("Feed: {}\n", feed.title));
        for story in &feed.stories {
            content.push_str(&format!("Title: {}\n", story.title()));
            content.push_str(&format!("Content: {}\n", story.content()));
            content.push_str(&format!("Link: {}\n\n", story.permalink().unwrap_or_default()));
        }
    }
    content
}

pub fn build_request(feeds: &[Feed], model_id: &str) -> ChatRequest {
    ChatRequest {
        model: model_id.to_string(),
        messages: vec![
            ChatMessage {
                role: Role::System,
                content: SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: Role::User,
                content: build_user_prompt(feeds),
            },
        ],
        max_tokens: MAX_TOKENS,
        temperature: TEMPERATURE,
    }
}

/// Summarize `feeds` into a digest. Errors are the caller's to handle.
pub fn compose_digest(
    feeds: &[Feed],
    model_id: &str,
    summarizer: &dyn Summarizer,
) -> Result<String, SummarizeError> {
    summarizer.summarize(&build_request(feeds, model_id))
}
