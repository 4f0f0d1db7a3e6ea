//! Serve the timeblok-ai chat API over HTTP.
//!
//! # Usage
//!
//! ```bash
//! OPENAI_API_KEY=sk-... ACCESS_KEY=secret cargo run -p timeblok-ai-web
//! OPENAI_API_KEY=sk-... ACCESS_KEY=secret cargo run -p timeblok-ai-web -- --port 8080
//! ```
//!
//! Then POST a conversation:
//!
//! ```bash
//! curl -s localhost:8000/chat -H 'content-type: application/json' -d '{
//!   "entries": [{"role": "user", "content": "new: dentist friday 9:30am"}],
//!   "auth": {"access_key": "secret"}
//! }'
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use timeblok_ai_web::api::Settings;
use timeblok_ai_web::build_router;

/// Serve the timeblok-ai chat API over HTTP.
#[derive(Parser)]
#[command(name = "timeblok-ai-web")]
struct Args {
    /// Port to listen on.
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Directory of few-shot example transcripts.
    #[arg(long, default_value = "samples")]
    samples: String,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    tracing_subscriber::fmt().init();

    let args = Args::parse();
    let settings = Arc::new(Settings::from_env(&args.samples)?);

    let router = build_router(settings);
    let bind_addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .map_err(|e| format!("failed to bind {bind_addr}: {e}"))?;
    println!("Chat API: http://{}", listener.local_addr().unwrap());

    axum::serve(listener, router)
        .await
        .map_err(|e| format!("server error: {e}"))
}
