//! Liveness endpoint

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub service: String,
}

pub fn create_router() -> Router { create_router_with_name("feedwatch") }

pub fn create_router_with_name(service: &str) -> Router {
    Router::new()
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { service: service.to_string() })
}

async fn health(State(s): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": s.service,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
