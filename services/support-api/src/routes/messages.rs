//! Ticket conversation handlers

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use serde_json::json;
use tracing::info;

use super::internal;
use crate::{
    AppState,
    error::{ApiError, ApiResult},
    models::NewMessageRequest,
};

/// Post a message to an open ticket and notify the owner
pub async fn add_message(
    State(state): State<AppState>,
    WithRejection(Path(ticket_id), _): WithRejection<Path<i32>, ApiError>,
    payload: Result<Json<NewMessageRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let ticket = state
        .ticket_repository
        .find_state(ticket_id)
        .await
        .map_err(internal("Failed to add message"))?
        .ok_or_else(|| ApiError::NotFound("Ticket not found".to_string()))?;

    if ticket.is_closed() {
        return Err(ApiError::BadRequest(
            "Cannot add a message to a closed ticket".to_string(),
        ));
    }

    let Json(payload) = payload?;
    payload.validate().map_err(ApiError::BadRequest)?;

    let message_id = state
        .message_repository
        .create(ticket_id, &payload)
        .await
        .map_err(internal("Failed to add message"))?;

    info!(
        ticket_id,
        message_id,
        sender_type = %payload.sender_type,
        "Message added"
    );
    state
        .notifier
        .message_added(ticket_id, ticket.user_id, &payload.message);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Message added",
            "message_id": message_id,
        })),
    ))
}

/// Conversation of a ticket, oldest first
pub async fn list_messages(
    State(state): State<AppState>,
    WithRejection(Path(ticket_id), _): WithRejection<Path<i32>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let exists = state
        .ticket_repository
        .exists(ticket_id)
        .await
        .map_err(internal("Failed to load messages"))?;
    if !exists {
        return Err(ApiError::NotFound("Ticket not found".to_string()));
    }

    let messages = state
        .message_repository
        .list_for_ticket(ticket_id)
        .await
        .map_err(internal("Failed to load messages"))?;

    Ok(Json(json!({ "messages": messages })))
}
