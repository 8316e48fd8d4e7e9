//! Handlers for the `/persons` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use facia_core::error::CoreError;
use facia_core::types::DbId;
use facia_db::models::{FaceEncoding, Person};
use facia_db::repositories::{EncodingRepo, PersonRepo};
use facia_engine::reconcile::PersonDeletionSummary;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePerson {
    pub name: String,
}

/// POST /api/v1/persons
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreatePerson>,
) -> AppResult<(StatusCode, Json<DataResponse<Person>>)> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Person name must not be empty".to_string(),
        )));
    }
    let person = PersonRepo::create(&state.pool, name).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: person })))
}

/// GET /api/v1/persons
pub async fn list(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Person>>>> {
    let persons = PersonRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: persons }))
}

/// GET /api/v1/persons/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Person>>> {
    let person = PersonRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Person",
            id,
        }))?;
    Ok(Json(DataResponse { data: person }))
}

/// GET /api/v1/persons/{id}/encodings
pub async fn list_encodings(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<FaceEncoding>>>> {
    PersonRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Person",
            id,
        }))?;
    let encodings = EncodingRepo::list_by_person(&state.pool, id).await?;
    Ok(Json(DataResponse { data: encodings }))
}

/// DELETE /api/v1/persons/{id}
///
/// Deletes the identity and its templates; faces revert to unassigned.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PersonDeletionSummary>>> {
    let summary = state.engine.delete_person(id).await?;
    Ok(Json(DataResponse { data: summary }))
}
