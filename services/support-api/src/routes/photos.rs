//! Ticket photo handlers

use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::WithRejection;
use serde_json::json;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::{error, info};

use super::internal;
use crate::{
    AppState,
    error::{ApiError, ApiResult},
    models::NewPhoto,
};

/// Multipart form fields of a photo upload
#[derive(Debug, Default)]
struct PhotoUpload {
    sender_type: String,
    sender_id: Option<String>,
    message_id: Option<String>,
    file_name: String,
    bytes: Option<Vec<u8>>,
}

impl PhotoUpload {
    async fn read(multipart: &mut Multipart) -> ApiResult<Self> {
        let mut upload = PhotoUpload::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "sender_type" => upload.sender_type = field.text().await?,
                "sender_id" => upload.sender_id = Some(field.text().await?),
                "message_id" => upload.message_id = Some(field.text().await?),
                "photo" => {
                    upload.file_name = field.file_name().unwrap_or_default().to_string();
                    upload.bytes = Some(field.bytes().await?.to_vec());
                }
                _ => {}
            }
        }

        Ok(upload)
    }

    fn sender_id(&self) -> ApiResult<i64> {
        self.sender_id
            .as_deref()
            .and_then(|v| v.trim().parse().ok())
            .ok_or_else(|| ApiError::BadRequest("Invalid sender id".to_string()))
    }

    /// Optional message the photo belongs to; an empty value means none
    fn message_id(&self) -> ApiResult<Option<i32>> {
        match self.message_id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| ApiError::BadRequest("Invalid message id".to_string())),
        }
    }
}

/// Store an uploaded photo for a ticket
pub async fn upload_photo(
    State(state): State<AppState>,
    WithRejection(Path(ticket_id), _): WithRejection<Path<i32>, ApiError>,
    WithRejection(mut multipart, _): WithRejection<Multipart, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let exists = state
        .ticket_repository
        .exists(ticket_id)
        .await
        .map_err(internal("Failed to upload photo"))?;
    if !exists {
        return Err(ApiError::NotFound("Ticket not found".to_string()));
    }

    let upload = PhotoUpload::read(&mut multipart).await?;
    let sender_id = upload.sender_id()?;
    let message_id = upload.message_id()?;
    let bytes = upload
        .bytes
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("Photo file is required".to_string()))?;

    let stored = state
        .photo_storage
        .save(ticket_id, &upload.file_name, bytes)
        .await
        .map_err(internal("Failed to upload photo"))?;

    let photo = NewPhoto {
        ticket_id,
        sender_type: upload.sender_type.clone(),
        sender_id,
        file_path: stored.file_path.clone(),
        file_id: stored.file_id.clone(),
        message_id,
    };

    let photo_id = match state.photo_repository.create(&photo).await {
        Ok(id) => id,
        Err(e) => {
            state.photo_storage.remove(&stored.file_path).await;
            return Err(internal("Failed to upload photo")(e));
        }
    };

    info!(ticket_id, photo_id, file_id = %stored.file_id, "Photo uploaded");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Photo uploaded",
            "photo_id": photo_id,
            "file_id": stored.file_id,
            "file_path": stored.file_path,
        })),
    ))
}

/// Stream the stored file behind a photo
pub async fn get_photo(
    State(state): State<AppState>,
    WithRejection(Path(photo_id), _): WithRejection<Path<i32>, ApiError>,
    request: Request,
) -> ApiResult<Response> {
    let file_path = state
        .photo_repository
        .find_file_path(photo_id)
        .await
        .map_err(internal("Failed to load photo"))?
        .ok_or_else(|| ApiError::NotFound("Photo not found".to_string()))?;

    if !tokio::fs::try_exists(&file_path).await.unwrap_or(false) {
        error!(photo_id, file_path = %file_path, "Photo file missing on disk");
        return Err(ApiError::NotFound("Photo file not found".to_string()));
    }

    match ServeFile::new(&file_path).oneshot(request).await {
        Ok(response) => Ok(response.map(Body::new)),
        Err(never) => match never {},
    }
}

/// Delete a photo row, then its file
pub async fn delete_photo(
    State(state): State<AppState>,
    WithRejection(Path(photo_id), _): WithRejection<Path<i32>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let file_path = state
        .photo_repository
        .find_file_path(photo_id)
        .await
        .map_err(internal("Failed to delete photo"))?
        .ok_or_else(|| ApiError::NotFound("Photo not found".to_string()))?;

    state
        .photo_repository
        .delete(photo_id)
        .await
        .map_err(internal("Failed to delete photo"))?;

    state.photo_storage.remove(&file_path).await;

    info!(photo_id, "Photo deleted");

    Ok(Json(json!({
        "message": "Photo deleted",
        "photo_id": photo_id,
    })))
}
