//! Handlers for the `/faces` resource: identity commit and reassignment.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use facia_core::error::CoreError;
use facia_core::types::DbId;
use facia_db::models::DetectedFace;
use facia_db::repositories::FaceRepo;
use facia_engine::assignment::{AssignmentTarget, CommittedAssignment};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Body for POST /faces/{id}/assign. Exactly one of `name` and `person_id`
/// must be present.
#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    /// Create a new person with this name.
    pub name: Option<String>,
    /// Assign to an existing person.
    pub person_id: Option<DbId>,
}

impl AssignRequest {
    fn into_target(self) -> Result<AssignmentTarget, AppError> {
        match (self.name, self.person_id) {
            (Some(name), None) => Ok(AssignmentTarget::NewName(name)),
            (None, Some(person_id)) => Ok(AssignmentTarget::Existing(person_id)),
            _ => Err(AppError::BadRequest(
                "Provide exactly one of 'name' or 'person_id'".to_string(),
            )),
        }
    }
}

/// Body for POST /faces/{id}/reassign. A null or absent `person_id` reverts
/// the face to unassigned.
#[derive(Debug, Deserialize)]
pub struct ReassignRequest {
    pub person_id: Option<DbId>,
}

/// GET /api/v1/faces/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DetectedFace>>> {
    let face = FaceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "DetectedFace",
            id,
        }))?;
    Ok(Json(DataResponse { data: face }))
}

/// POST /api/v1/faces/{id}/assign
///
/// Commit an identity for an unassigned face. Conflicts (face already
/// assigned) surface as 409; upstream indexing failures roll the commit back
/// and surface as 502/503.
pub async fn assign(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<AssignRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<CommittedAssignment>>)> {
    let target = body.into_target()?;
    let committed = state.engine.commit_assignment(id, target).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: committed })))
}

/// POST /api/v1/faces/{id}/reassign
pub async fn reassign(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<ReassignRequest>,
) -> AppResult<Json<DataResponse<DetectedFace>>> {
    let face = state.engine.reassign(id, body.person_id).await?;
    Ok(Json(DataResponse { data: face }))
}
