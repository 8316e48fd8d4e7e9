//! The `/api/v1` route tree.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{faces, maintenance, persons, photos};
use crate::state::AppState;

/// Maximum accepted upload size for photo bodies.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /photos                      upload (POST)
/// /photos/{id}                 get, delete
/// /photos/{id}/faces           list detected faces
/// /photos/{id}/detect          run detection pass (POST)
/// /photos/{id}/recognize       run recognition pass (POST)
///
/// /faces/{id}                  get
/// /faces/{id}/assign           commit an identity (POST)
/// /faces/{id}/reassign         move or revert an assignment (POST)
///
/// /persons                     list, create
/// /persons/{id}                get, delete
/// /persons/{id}/encodings      list templates backing the identity
///
/// /maintenance/drift           local/remote template drift report
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/photos",
            post(photos::upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/photos/{id}",
            get(photos::get_by_id).delete(photos::delete),
        )
        .route("/photos/{id}/faces", get(photos::list_faces))
        .route("/photos/{id}/detect", post(photos::detect))
        .route("/photos/{id}/recognize", post(photos::recognize))
        .route("/faces/{id}", get(faces::get_by_id))
        .route("/faces/{id}/assign", post(faces::assign))
        .route("/faces/{id}/reassign", post(faces::reassign))
        .route("/persons", get(persons::list).post(persons::create))
        .route(
            "/persons/{id}",
            get(persons::get_by_id).delete(persons::delete),
        )
        .route("/persons/{id}/encodings", get(persons::list_encodings))
        .route("/maintenance/drift", get(maintenance::drift_report))
}
