//! HTTP endpoint handlers and request/response types.
//!
//! The chat endpoint is stateless: each request carries the full live
//! conversation plus auth info, and the server prepends the freshly
//! assembled base prompt before calling the completion API. Nothing is
//! kept between requests.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use timeblok_ai::extract::extract_script;
use timeblok_ai::prompt::base_conversation;
use timeblok_ai::{Credentials, Message, MessageRole, OpenAiClient};

// ── Settings / state ───────────────────────────────────────────────

/// Server-held configuration, loaded once at startup.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Provider key used on behalf of callers that present the access key.
    pub openai_api_key: String,
    /// Alternate completions API base, if any.
    pub openai_api_base: Option<String>,
    /// Shared secret that grants use of the server's provider key.
    pub access_key: String,
    /// Directory of few-shot example transcripts.
    pub samples_dir: PathBuf,
}

impl Settings {
    /// Read settings from the environment. `OPENAI_API_KEY` and
    /// `ACCESS_KEY` are required; a missing one is fatal at startup.
    pub fn from_env(samples_dir: impl Into<PathBuf>) -> Result<Self, String> {
        let openai_api_key =
            std::env::var("OPENAI_API_KEY").map_err(|_| "OPENAI_API_KEY not set".to_string())?;
        let access_key =
            std::env::var("ACCESS_KEY").map_err(|_| "ACCESS_KEY not set".to_string())?;
        Ok(Self {
            openai_api_key,
            openai_api_base: std::env::var("OPENAI_API_BASE").ok(),
            access_key,
            samples_dir: samples_dir.into(),
        })
    }
}

/// Shared application state passed to handlers via axum's `State`.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
}

// ── Request / response types ───────────────────────────────────────

/// Caller-supplied authentication: either the shared access key or a
/// provider key of their own.
#[derive(Deserialize, Debug, Default)]
pub struct AuthInfo {
    pub access_key: Option<String>,
    pub openai_key: Option<String>,
}

impl AuthInfo {
    /// Resolve the provider key to use for this request.
    ///
    /// An access key matching the server secret wins and selects the
    /// server's configured key, even when `openai_key` is also supplied;
    /// otherwise the caller's own key is used; `None` means the request
    /// cannot be served.
    pub fn resolve_key(&self, settings: &Settings) -> Option<String> {
        if self.access_key.as_deref() == Some(settings.access_key.as_str()) {
            return Some(settings.openai_api_key.clone());
        }
        self.openai_key.clone()
    }
}

/// One entry of the caller's conversation history.
#[derive(Deserialize, Debug)]
pub struct ChatHistoryEntry {
    pub role: MessageRole,
    pub content: String,
}

/// Request body for POST /chat.
#[derive(Deserialize, Debug)]
pub struct ChatHistory {
    pub entries: Vec<ChatHistoryEntry>,
    pub auth: AuthInfo,
}

type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (status, Json(json!({ "detail": detail.into() })))
}

// ── Handlers ───────────────────────────────────────────────────────

/// GET / — health-check greeting.
pub async fn get_root() -> Json<Value> {
    Json(json!({ "message": "Hello World" }))
}

/// POST /chat — run one completion over the supplied conversation.
///
/// Returns the raw reply, the extracted script (or `null`), and the
/// assistant message envelope.
pub async fn post_chat(
    State(app): State<AppState>,
    Json(body): Json<ChatHistory>,
) -> Result<Json<Value>, ApiError> {
    let Some(key) = body.auth.resolve_key(&app.settings) else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Access key or OpenAI API key must be provided.",
        ));
    };

    let credentials = Credentials::new(key, app.settings.openai_api_base.clone());
    let client = OpenAiClient::new(credentials)
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e))?;

    // Base prompt is assembled per request so the date stays current.
    let mut messages = base_conversation(&app.settings.samples_dir)
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e))?;
    messages.extend(
        body.entries
            .into_iter()
            .map(|e| Message { role: e.role, content: e.content }),
    );

    debug!("Chat request: {} message(s) total", messages.len());

    let completion = client.chat(&messages).await.map_err(|e| {
        warn!("completion call failed: {e}");
        api_error(StatusCode::BAD_GATEWAY, e)
    })?;

    let parsed = extract_script(completion.content()).map(str::to_string);

    Ok(Json(json!({
        "content": completion.content(),
        "parsed": parsed,
        "completion": completion.message,
    })))
}
