//! Ticket lifecycle handlers

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
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
    models::{
        ListQuery, NewTicketRequest, TicketDetailResponse, TicketListResponse, TicketPatch,
        UpdateTicketRequest,
    },
};

/// Page size for ticket listings
pub const DEFAULT_TICKET_LIMIT: i64 = 10;

/// List tickets, newest first, optionally filtered by status
pub async fn list_tickets(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<ListQuery>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let pagination = query.pagination(DEFAULT_TICKET_LIMIT);

    let (tickets, total) = state
        .ticket_repository
        .list(query.status(), pagination)
        .await
        .map_err(internal("Failed to load tickets"))?;

    Ok(Json(TicketListResponse {
        tickets,
        total,
        page: pagination.page,
        limit: pagination.limit,
    }))
}

/// Get a ticket with its messages and photos
pub async fn get_ticket(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let ticket = state
        .ticket_repository
        .find_by_id(id)
        .await
        .map_err(internal("Failed to load ticket"))?
        .ok_or_else(|| ApiError::NotFound("Ticket not found".to_string()))?;

    let messages = state
        .message_repository
        .list_for_ticket(id)
        .await
        .map_err(internal("Failed to load ticket"))?;

    let photos = state
        .photo_repository
        .list_for_ticket(id)
        .await
        .map_err(internal("Failed to load ticket"))?;

    Ok(Json(TicketDetailResponse {
        ticket,
        messages,
        photos,
    }))
}

/// Open a new ticket for an existing user
pub async fn create_ticket(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<NewTicketRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    payload.validate().map_err(ApiError::BadRequest)?;

    let user_exists = state
        .user_repository
        .exists(payload.user_id)
        .await
        .map_err(internal("Failed to create ticket"))?;
    if !user_exists {
        return Err(ApiError::BadRequest("User not found".to_string()));
    }

    let ticket_id = state
        .ticket_repository
        .create(
            payload.user_id,
            &payload.title,
            &payload.description,
            payload.category(),
        )
        .await
        .map_err(internal("Failed to create ticket"))?;

    info!(ticket_id, user_id = payload.user_id, "Ticket created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Ticket created",
            "ticket_id": ticket_id,
        })),
    ))
}

/// Change the status and/or category of a ticket and notify its owner
pub async fn update_ticket(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, ApiError>,
    payload: Result<Json<UpdateTicketRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let ticket = state
        .ticket_repository
        .find_state(id)
        .await
        .map_err(internal("Failed to update ticket"))?
        .ok_or_else(|| ApiError::NotFound("Ticket not found".to_string()))?;

    let Json(payload) = payload?;
    let patch = TicketPatch::from(payload);
    if patch.is_empty() {
        return Err(ApiError::BadRequest("Nothing to update".to_string()));
    }

    state
        .ticket_repository
        .update(id, &patch)
        .await
        .map_err(internal("Failed to update ticket"))?;

    info!(ticket_id = id, status = ?patch.status, category = ?patch.category, "Ticket updated");
    state.notifier.ticket_updated(id, ticket.user_id, &patch);

    Ok(Json(json!({
        "message": "Ticket updated",
        "ticket_id": id,
    })))
}

/// Delete a ticket together with its messages and photos
pub async fn delete_ticket(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let exists = state
        .ticket_repository
        .exists(id)
        .await
        .map_err(internal("Failed to delete ticket"))?;
    if !exists {
        return Err(ApiError::NotFound("Ticket not found".to_string()));
    }

    let file_paths = state
        .ticket_repository
        .delete_cascade(id)
        .await
        .map_err(internal("Failed to delete ticket"))?;

    for file_path in &file_paths {
        state.photo_storage.remove(file_path).await;
    }

    info!(ticket_id = id, photos = file_paths.len(), "Ticket deleted");

    Ok(Json(json!({
        "message": "Ticket deleted",
        "ticket_id": id,
    })))
}
