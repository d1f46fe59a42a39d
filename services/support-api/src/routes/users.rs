//! User handlers

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use serde_json::json;
use tracing::info;

use super::internal;
use crate::{
    AppState,
    error::{ApiError, ApiResult},
    models::{ListQuery, NewUserRequest, UpdateUserRequest, UserDetailResponse, UserListResponse},
};

/// Page size for user listings
pub const DEFAULT_USER_LIMIT: i64 = 20;

/// List users ordered by id
pub async fn list_users(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<ListQuery>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let pagination = query.pagination(DEFAULT_USER_LIMIT);

    let (users, total) = state
        .user_repository
        .list(pagination)
        .await
        .map_err(internal("Failed to load users"))?;

    Ok(Json(UserListResponse {
        users,
        total,
        page: pagination.page,
        limit: pagination.limit,
    }))
}

/// Get a user with the tickets they filed
pub async fn get_user(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .user_repository
        .find_by_id(id)
        .await
        .map_err(internal("Failed to load user"))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let tickets = state
        .ticket_repository
        .list_for_user(id)
        .await
        .map_err(internal("Failed to load user"))?;

    Ok(Json(UserDetailResponse { user, tickets }))
}

/// Register a user under the id assigned by the messaging platform
pub async fn create_user(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<NewUserRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    payload.validate().map_err(ApiError::BadRequest)?;

    let exists = state
        .user_repository
        .exists(payload.id)
        .await
        .map_err(internal("Failed to create user"))?;
    if exists {
        return Err(ApiError::BadRequest("User already exists".to_string()));
    }

    let user = payload.into_user(Utc::now());
    state
        .user_repository
        .create(&user)
        .await
        .map_err(internal("Failed to create user"))?;

    info!(user_id = user.id, "User created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created",
            "user_id": user.id,
        })),
    ))
}

/// Merge profile changes into an existing user
pub async fn update_user(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let mut user = state
        .user_repository
        .find_by_id(id)
        .await
        .map_err(internal("Failed to update user"))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let Json(payload) = payload?;
    payload.apply_to(&mut user, Utc::now());

    state
        .user_repository
        .update(&user)
        .await
        .map_err(internal("Failed to update user"))?;

    info!(user_id = id, "User updated");

    Ok(Json(json!({
        "message": "User updated",
        "user_id": id,
    })))
}
