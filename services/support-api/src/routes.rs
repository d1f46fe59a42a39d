//! Support API routes

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    AppState,
    config::AppConfig,
    error::{ApiError, ApiResult},
    middleware::cors_layer,
};

pub mod messages;
pub mod photos;
pub mod tickets;
pub mod users;

/// Create the router for the support API
pub fn create_router(state: AppState, config: &AppConfig) -> Router {
    let uploads = ServeDir::new(state.photo_storage.root());

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .route(
            "/api/tickets",
            get(tickets::list_tickets).post(tickets::create_ticket),
        )
        .route(
            "/api/tickets/:id",
            get(tickets::get_ticket)
                .put(tickets::update_ticket)
                .delete(tickets::delete_ticket),
        )
        .route(
            "/api/tickets/:id/messages",
            get(messages::list_messages).post(messages::add_message),
        )
        .route("/api/tickets/:id/photos", post(photos::upload_photo))
        .route(
            "/api/tickets/photos/:photo_id",
            get(photos::get_photo).delete(photos::delete_photo),
        )
        .route("/api/users", get(users::list_users).post(users::create_user))
        .route("/api/users/:id", get(users::get_user).put(users::update_user))
        .nest_service("/uploads", uploads.clone())
        .nest_service("/api/uploads", uploads)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.allow_origins))
        .with_state(state)
}

/// Service banner
pub async fn index() -> impl IntoResponse {
    Json(json!({
        "message": "Support ticket API is running"
    }))
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "support-api"
    }))
}

/// Readiness check, including database connectivity
pub async fn readiness_check(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    common::database::health_check(&state.db_pool).await?;

    Ok(Json(json!({ "status": "ok", "database": "ok" })))
}

/// Log an unexpected failure and turn it into a generic client-facing error
pub(crate) fn internal(message: &'static str) -> impl FnOnce(anyhow::Error) -> ApiError {
    move |e| {
        tracing::error!("{}: {:#}", message, e);
        ApiError::Internal(message)
    }
}
