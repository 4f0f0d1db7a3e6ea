//! HTTP chat endpoint for timeblok-ai.
//!
//! `timeblok-ai-web` exposes the prompt-assembly + completion + extraction
//! pipeline from `timeblok-ai` as a minimal JSON API:
//!
//! - `GET /` — health-check greeting.
//! - `POST /chat` — accepts `{entries: [{role, content}], auth:
//!   {access_key?, openai_key?}}` and returns `{content, parsed,
//!   completion}`.
//!
//! The endpoint is stateless: callers resend their full conversation on
//! every request, and the server prepends a freshly assembled base prompt.
//! Callers either present the shared access key (to use the server's
//! provider key) or bring their own provider key.
//!
//! # Quick start
//!
//! ```ignore
//! use std::sync::Arc;
//! use timeblok_ai_web::{WebConfig, api::Settings, spawn_web};
//!
//! let settings = Arc::new(Settings::from_env("samples")?);
//! let addr = spawn_web(settings, WebConfig::default()).await;
//! println!("Chat API: http://{addr}");
//! ```

pub mod api;
mod server;

pub use server::build_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::Settings;

/// Configuration for the web server.
pub struct WebConfig {
    /// Address to bind to. Default: `127.0.0.1:8000`. Port 0 binds a
    /// random free port (used by the integration tests).
    pub bind_addr: SocketAddr,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
        }
    }
}

/// Spawn the web server on a Tokio task and return the bound address.
///
/// The server runs until the Tokio runtime shuts down. Requests are
/// independent; the only shared state is the read-only [`Settings`].
pub async fn spawn_web(settings: Arc<Settings>, config: WebConfig) -> SocketAddr {
    let router = server::build_router(settings);
    server::start_server(router, config.bind_addr).await
}
