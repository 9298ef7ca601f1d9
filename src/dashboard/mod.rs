//! Dashboard: Axum web server for playing the game in a browser.
//!
//! Serves the embedded game page and a small JSON API. Handlers never touch
//! the session directly: they read the published `GameView` and send
//! commands to the game loop.

pub mod routes;
pub mod view;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    response::Html,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use routes::AppState;

/// The embedded game page (compiled into the binary).
const GAME_HTML: &str = include_str!("templates/index.html");

/// Bind the dashboard port and serve in a background task.
pub async fn spawn_dashboard(state: AppState, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind dashboard port {port}"))?;
    info!(port, "Dashboard server starting on http://localhost:{port}");

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "Dashboard server error");
        }
    });

    Ok(())
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("*"))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        // Game
        .route("/api/state", get(routes::get_state))
        .route("/api/predict/:direction", post(routes::predict))
        // Tasks, withdrawal, invite
        .route("/api/tasks", get(routes::get_tasks))
        .route("/api/tasks/:id/complete", post(routes::complete_task))
        .route("/api/withdraw/quote", get(routes::get_quote))
        .route("/api/withdraw", post(routes::withdraw))
        .route("/api/invite", get(routes::get_invite))
        .route("/health", get(routes::health))
        // Game page
        .route("/", get(serve_page))
        .layer(cors)
        .with_state(state)
}

async fn serve_page() -> Html<&'static str> {
    Html(GAME_HTML)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
