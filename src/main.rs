use anyhow::Result;
use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;

use flightdesk::FlightDeskService;
use flightdesk::compose::WELCOME;
use flightdesk::config::Config;
use flightdesk::models::{ChatRequest, ChatResponse, HealthResponse};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::load();
    let bind: SocketAddr = config
        .server
        .bind
        .parse()
        .expect("Invalid server bind address (expected host:port)");

    let service = Arc::new(FlightDeskService::new(&config)?);

    let app = Router::new()
        .route("/", get(health))
        .route("/chat", post(chat))
        .with_state(service);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(%bind, backend = ?config.backend.mode, "starting flightdesk server");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: WELCOME.to_string(),
    })
}

/// One inbound message, one turn-ending reply. The service never surfaces an
/// error past the turn boundary.
async fn chat(
    State(service): State<Arc<FlightDeskService>>,
    Json(req): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let outcome = service.answer(&req.message).await;
    Json(ChatResponse {
        reply: outcome.reply,
    })
}
