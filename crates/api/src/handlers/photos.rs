//! Handlers for the `/photos` resource: upload, status, detection and
//! recognition triggers, deletion.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;

use facia_core::error::CoreError;
use facia_core::types::DbId;
use facia_db::models::{DetectedFace, Photo};
use facia_db::repositories::{FaceRepo, PhotoRepo};
use facia_engine::detection::DetectionOutcome;
use facia_engine::recognition::RecognitionOutcome;
use facia_engine::reconcile::PhotoDeletionSummary;
use facia_engine::ImageStore;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/photos
///
/// Accept a multipart upload with one `image` field, persist the bytes, and
/// register the photo in `pending` state. Detection is a separate trigger.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Photo>>)> {
    let mut image: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        image = Some(data.to_vec());
        break;
    }

    let image = image.ok_or_else(|| {
        AppError::BadRequest("Multipart upload must contain an 'image' field".to_string())
    })?;
    if image.is_empty() {
        return Err(AppError::BadRequest("Uploaded image is empty".to_string()));
    }

    let storage_key = state
        .engine
        .store()
        .save(&image)
        .await
        .map_err(|e| AppError::Engine(e.into()))?;
    let photo = PhotoRepo::create(&state.pool, &storage_key).await?;

    tracing::info!(photo_id = photo.id, size = image.len(), "Photo uploaded");
    Ok((StatusCode::CREATED, Json(DataResponse { data: photo })))
}

/// GET /api/v1/photos/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Photo>>> {
    let photo = PhotoRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Photo",
            id,
        }))?;
    Ok(Json(DataResponse { data: photo }))
}

/// GET /api/v1/photos/{id}/faces
pub async fn list_faces(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<DetectedFace>>>> {
    PhotoRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Photo",
            id,
        }))?;
    let faces = FaceRepo::list_by_photo(&state.pool, id).await?;
    Ok(Json(DataResponse { data: faces }))
}

/// POST /api/v1/photos/{id}/detect
///
/// Runs the detection pass synchronously. A failed run is reported in the
/// outcome body, not as an HTTP error; the photo row carries the state.
pub async fn detect(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DetectionOutcome>>> {
    let outcome = state.engine.run_detection(id).await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// POST /api/v1/photos/{id}/recognize
pub async fn recognize(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<RecognitionOutcome>>> {
    let outcome = state.engine.run_recognition(id).await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// DELETE /api/v1/photos/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PhotoDeletionSummary>>> {
    let summary = state.engine.delete_photo(id).await?;
    Ok(Json(DataResponse { data: summary }))
}
