//! atlas HTTP server.
//!
//! Exposes the agent pipeline over REST:
//!
//! - `GET  /` — server status
//! - `POST /ask` — handle one utterance, returns the agent response
//!
//! Build and run: `cargo run --features server --bin atlas-server`

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use atlas::agent::{Agent, AgentResponse};
use atlas::config::AgentConfig;

// ── Request/response types ────────────────────────────────────────────────

#[derive(Serialize)]
struct StatusResponse {
    status: String,
    version: String,
}

#[derive(Deserialize)]
struct AskRequest {
    #[serde(default)]
    query: String,
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn ask(
    State(agent): State<Arc<Agent>>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AgentResponse>, (StatusCode, String)> {
    let query = request.query.trim().to_string();
    if query.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "empty query".to_string()));
    }

    // The pipeline is blocking (subprocesses, sync HTTP); keep it off the
    // async workers.
    let agent = Arc::clone(&agent);
    let response = tokio::task::spawn_blocking(move || agent.handle(&query))
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("handler panicked: {e}"),
            )
        })?;
    Ok(Json(response))
}

// ── Main ──────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("atlas=info")),
        )
        .init();

    let bind = std::env::var("ATLAS_SERVER_BIND").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("ATLAS_SERVER_PORT").unwrap_or_else(|_| "5000".to_string());
    let addr = format!("{bind}:{port}");

    let config = AgentConfig::load(None).unwrap_or_else(|e| {
        tracing::error!("failed to load configuration: {e}");
        std::process::exit(1);
    });
    let agent = Agent::new(config).unwrap_or_else(|e| {
        tracing::error!("failed to initialize agent: {e}");
        std::process::exit(1);
    });
    let agent = Arc::new(agent);

    let app = Router::new()
        .route("/", get(status))
        .route("/ask", post(ask))
        .layer(CorsLayer::permissive())
        .with_state(agent);

    tracing::info!("atlas server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
