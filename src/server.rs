use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::timeout::TimeoutLayer;

use crate::analysis::AnalysisService;
use crate::handlers;
use crate::session::SessionManager;

/// Request bodies above this size are rejected with 413.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

// ============================================================================
// Application State
// ============================================================================

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionManager,
    pub analysis: AnalysisService,
    pub max_connections: usize,
}

// ============================================================================
// Server Setup
// ============================================================================

pub fn build_app(state: AppState, request_timeout_seconds: u64) -> Router {
    let max_connections = state.max_connections;

    // Streaming replies are bounded by the gateway's idle timeout instead.
    let streaming_routes = Router::new()
        .route("/send-message", post(handlers::chat::send_message))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route(
            "/create-chat-session",
            post(handlers::chat::create_session),
        )
        .route(
            "/chat-history/{session_id}",
            get(handlers::chat::chat_history),
        )
        .route(
            "/health-insights",
            post(handlers::analysis::health_insights),
        )
        .route(
            "/advanced-health-analysis",
            post(handlers::analysis::advanced_health_analysis),
        )
        .route(
            "/analyze-wellness",
            post(handlers::analysis::analyze_wellness),
        )
        .with_state(state.clone())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(request_timeout_seconds),
        ));

    let api = Router::new()
        .merge(streaming_routes)
        .merge(api_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(ConcurrencyLimitLayer::new(max_connections));

    Router::new()
        .route("/", get(handlers::welcome))
        .route("/livez", get(handlers::livez))
        .route("/readyz", get(handlers::readyz))
        .route("/version", get(handlers::version))
        .with_state(state)
        .nest("/api", api)
}
