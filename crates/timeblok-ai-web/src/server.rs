//! Axum server setup and router construction.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

use crate::api::{self, AppState, Settings};

/// Build the full axum router.
///
/// The router serves:
/// - `GET /` — health-check greeting
/// - `POST /chat` — stateless chat completion
///
/// All routes sit behind a permissive CORS layer so browser front-ends on
/// any origin can call them.
pub fn build_router(settings: Arc<Settings>) -> Router {
    let state = AppState { settings };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(api::get_root))
        .route("/chat", post(api::post_chat))
        .with_state(state)
        .layer(cors)
}

/// Start the axum server and return the bound address.
pub async fn start_server(router: Router, bind_addr: SocketAddr) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind(bind_addr).await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    addr
}
