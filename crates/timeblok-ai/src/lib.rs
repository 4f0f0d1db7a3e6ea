//! Conversational front-end for the timeblok calendar language.
//!
//! `timeblok-ai` turns natural-language scheduling requests into timeblok
//! scripts by driving an OpenAI-compatible chat-completions API. The crate
//! provides the four pieces every surface is built from:
//!
//! - [`transcripts`] — loads few-shot example transcripts from a directory
//!   (the two-marker `+++` / `---` plain-text format).
//! - [`prompt`] — assembles the base conversation: one system instruction
//!   (with today's date) followed by the examples as alternating
//!   user/assistant turns.
//! - [`OpenAiClient`] — sends an assembled conversation to the completions
//!   API and returns the assistant reply plus its envelope.
//! - [`extract`] — pulls the first ```` ```timeblok ```` fenced block out of
//!   a free-text reply, or reports that none was found.
//!
//! On top of those, [`repl`] implements the interactive terminal loop and
//! [`viewer`] hands a generated script to the external `timeblok` binary for
//! calendar preview. The companion crate `timeblok-ai-web` exposes the same
//! chat capability over HTTP.
//!
//! # Getting started
//!
//! ```ignore
//! use timeblok_ai::{Credentials, OpenAiClient, extract::extract_script, prompt};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), String> {
//!     let credentials = Credentials::from_env()?;
//!     let client = OpenAiClient::new(credentials)?;
//!
//!     let mut messages = prompt::base_conversation("samples")?;
//!     messages.push(timeblok_ai::Message::user("new: gym every workday at 7am"));
//!
//!     let completion = client.chat(&messages).await?;
//!     match extract_script(completion.content()) {
//!         Some(script) => println!("{script}"),
//!         None => println!("(no script in reply)"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod extract;
pub mod prompt;
pub mod repl;
pub mod transcripts;
pub mod viewer;

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

// ── Constants ──────────────────────────────────────────────────────

/// Default API base. Joined with `/chat/completions` to form the endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Model used for all completion calls.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

// ── Message types ──────────────────────────────────────────────────

/// Role of a message in the conversation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A message in the conversation. The first message of an assembled
/// conversation is always `system`; user and assistant turns alternate
/// after it (by construction, not validated).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

// ── Request / response types ───────────────────────────────────────

/// Chat completion request body.
#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
}

/// Raw API response (internal deserialization target).
#[derive(Deserialize, Debug)]
struct RawChatResponse {
    choices: Option<Vec<RawChoice>>,
    error: Option<ApiErrorResponse>,
    #[serde(default)]
    usage: Option<UsageInfo>,
}

#[derive(Deserialize, Debug)]
struct RawChoice {
    message: Message,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorResponse {
    message: String,
}

/// Token usage statistics.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UsageInfo {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

/// Clean return type from [`OpenAiClient::chat`]: the assistant message
/// envelope plus response metadata.
#[derive(Debug)]
pub struct ChatCompletion {
    pub message: Message,
    pub usage: Option<UsageInfo>,
    pub finish_reason: Option<String>,
}

impl ChatCompletion {
    /// The assistant's reply text.
    pub fn content(&self) -> &str {
        &self.message.content
    }
}

// ── Credentials ────────────────────────────────────────────────────

/// Provider credentials, passed explicitly to the client rather than held
/// in process-global configuration so concurrent callers can use
/// different keys.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub api_key: String,
    /// Alternate API base. `None` means [`DEFAULT_API_BASE`].
    pub api_base: Option<String>,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_base: Option<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base,
        }
    }

    /// Read credentials from `OPENAI_API_KEY` and (optionally)
    /// `OPENAI_API_BASE`.
    pub fn from_env() -> Result<Self, String> {
        let api_key =
            std::env::var("OPENAI_API_KEY").map_err(|_| "OPENAI_API_KEY not set".to_string())?;
        let api_base = std::env::var("OPENAI_API_BASE").ok();
        Ok(Self { api_key, api_base })
    }

    /// The chat-completions endpoint URL for these credentials.
    pub fn endpoint(&self) -> String {
        let base = self.api_base.as_deref().unwrap_or(DEFAULT_API_BASE);
        format!("{}/chat/completions", base.trim_end_matches('/'))
    }
}

// ── Client ─────────────────────────────────────────────────────────

/// Async HTTP client for an OpenAI-compatible chat completions API.
pub struct OpenAiClient {
    client: reqwest::Client,
    credentials: Credentials,
}

impl OpenAiClient {
    /// Create a new client with the given credentials.
    pub fn new(credentials: Credentials) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .user_agent("timeblok-ai/0.1")
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;
        Ok(Self {
            client,
            credentials,
        })
    }

    /// Send a chat completion request for the given conversation.
    ///
    /// Any transport or API-level failure surfaces as `Err` unmodified —
    /// no retry, no backoff, no caching.
    pub async fn chat(&self, messages: &[Message]) -> Result<ChatCompletion, String> {
        let body = ChatRequest {
            model: DEFAULT_MODEL,
            messages,
        };
        debug!(
            "LLM request: model={}, messages={}",
            body.model,
            messages.len()
        );
        trace!(
            "Request payload size: {} bytes",
            serde_json::to_string(&body).map_or(0, |s| s.len())
        );

        let start = Instant::now();

        let resp = self
            .client
            .post(self.credentials.endpoint())
            .header("Authorization", format!("Bearer {}", self.credentials.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| format!("failed to read response: {e}"))?;

        let elapsed = start.elapsed();
        debug!(
            "LLM response: HTTP {} in {:.1}s ({} bytes)",
            status,
            elapsed.as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(format!("completions API HTTP {status}: {text}"));
        }

        let parsed: RawChatResponse =
            serde_json::from_str(&text).map_err(|e| format!("failed to parse response: {e}"))?;

        if let Some(err) = parsed.error {
            return Err(format!("completions API error: {}", err.message));
        }

        if let Some(ref usage) = parsed.usage {
            debug!(
                "Token usage: prompt={}, completion={}, total={}",
                usage.prompt_tokens.unwrap_or(0),
                usage.completion_tokens.unwrap_or(0),
                usage.total_tokens.unwrap_or(0),
            );
        }

        let choice = parsed
            .choices
            .and_then(|c| c.into_iter().next())
            .ok_or_else(|| "completions API returned no choices".to_string())?;

        debug!("LLM output: {} chars text", choice.message.content.len());

        Ok(ChatCompletion {
            message: choice.message,
            usage: parsed.usage,
            finish_reason: choice.finish_reason,
        })
    }
}
