//! Repository for detected-face rows.
//!
//! Assignment-related writes guard on `person_id IS NULL` so that a
//! concurrent recognition pass or commit can never overwrite an existing
//! assignment; the row-level guard is the last line of the race policy.

use sqlx::{PgConnection, PgPool};

use facia_core::status::ReviewStatus;
use facia_core::types::DbId;

use crate::models::DetectedFace;
use crate::repositories::photo_repo::FACE_COLUMNS;

pub struct FaceRepo;

impl FaceRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<DetectedFace>, sqlx::Error> {
        let query = format!("SELECT {FACE_COLUMNS} FROM detected_faces WHERE id = $1");
        sqlx::query_as::<_, DetectedFace>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Load a face inside a transaction with a row lock, serializing
    /// concurrent commits on the same face.
    pub async fn lock_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<DetectedFace>, sqlx::Error> {
        let query = format!("SELECT {FACE_COLUMNS} FROM detected_faces WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, DetectedFace>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List all faces of a photo, ordered by insertion.
    pub async fn list_by_photo(
        pool: &PgPool,
        photo_id: DbId,
    ) -> Result<Vec<DetectedFace>, sqlx::Error> {
        let query =
            format!("SELECT {FACE_COLUMNS} FROM detected_faces WHERE photo_id = $1 ORDER BY id");
        sqlx::query_as::<_, DetectedFace>(&query)
            .bind(photo_id)
            .fetch_all(pool)
            .await
    }

    /// List faces of a photo that carry no identity yet.
    pub async fn list_unassigned(
        pool: &PgPool,
        photo_id: DbId,
    ) -> Result<Vec<DetectedFace>, sqlx::Error> {
        let query = format!(
            "SELECT {FACE_COLUMNS} FROM detected_faces \
             WHERE photo_id = $1 AND person_id IS NULL \
             ORDER BY id"
        );
        sqlx::query_as::<_, DetectedFace>(&query)
            .bind(photo_id)
            .fetch_all(pool)
            .await
    }

    /// Write one recognition result onto a face.
    ///
    /// Returns `false` when the face was assigned in the meantime (the
    /// `person_id IS NULL` guard did not match); the result is then dropped.
    pub async fn apply_recognition(
        pool: &PgPool,
        face_id: DbId,
        person_id: DbId,
        confidence: f64,
        review_status: ReviewStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE detected_faces SET \
                person_id = $2, \
                confidence = $3, \
                review_status = $4, \
                detection_method = 'auto_recognition' \
             WHERE id = $1 AND person_id IS NULL",
        )
        .bind(face_id)
        .bind(person_id)
        .bind(confidence)
        .bind(review_status.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Transaction-scoped manual assignment (identity commit step 2).
    pub async fn assign_in(
        conn: &mut PgConnection,
        face_id: DbId,
        person_id: DbId,
    ) -> Result<DetectedFace, sqlx::Error> {
        let query = format!(
            "UPDATE detected_faces SET \
                person_id = $2, \
                is_confirmed = TRUE, \
                review_status = 'confirmed', \
                detection_method = 'manual' \
             WHERE id = $1 \
             RETURNING {FACE_COLUMNS}"
        );
        sqlx::query_as::<_, DetectedFace>(&query)
            .bind(face_id)
            .bind(person_id)
            .fetch_one(conn)
            .await
    }

    /// Transaction-scoped template reference write (identity commit step 4).
    pub async fn set_template_in(
        conn: &mut PgConnection,
        face_id: DbId,
        template_id: &str,
    ) -> Result<DetectedFace, sqlx::Error> {
        let query = format!(
            "UPDATE detected_faces SET remote_template_id = $2 \
             WHERE id = $1 \
             RETURNING {FACE_COLUMNS}"
        );
        sqlx::query_as::<_, DetectedFace>(&query)
            .bind(face_id)
            .bind(template_id)
            .fetch_one(conn)
            .await
    }

    /// Revert one face to the unassigned state, preserving its geometry and
    /// quality score.
    pub async fn clear_assignment_in(
        conn: &mut PgConnection,
        face_id: DbId,
    ) -> Result<DetectedFace, sqlx::Error> {
        let query = format!(
            "UPDATE detected_faces SET \
                person_id = NULL, \
                remote_template_id = NULL, \
                confidence = NULL, \
                review_status = 'pending', \
                is_confirmed = FALSE, \
                detection_method = NULL \
             WHERE id = $1 \
             RETURNING {FACE_COLUMNS}"
        );
        sqlx::query_as::<_, DetectedFace>(&query)
            .bind(face_id)
            .fetch_one(conn)
            .await
    }

    /// Revert every face owned by a person to the unassigned state.
    /// Used by person deletion: photo evidence is preserved, not cascaded.
    pub async fn revert_by_person_in(
        conn: &mut PgConnection,
        person_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE detected_faces SET \
                person_id = NULL, \
                remote_template_id = NULL, \
                confidence = NULL, \
                review_status = 'pending', \
                is_confirmed = FALSE, \
                detection_method = NULL \
             WHERE person_id = $1",
        )
        .bind(person_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_by_photo_in(
        conn: &mut PgConnection,
        photo_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM detected_faces WHERE photo_id = $1")
            .bind(photo_id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// Remote template ids referenced by a photo's faces (for cleanup).
    pub async fn list_template_ids_by_photo(
        pool: &PgPool,
        photo_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT remote_template_id FROM detected_faces \
             WHERE photo_id = $1 AND remote_template_id IS NOT NULL",
        )
        .bind(photo_id)
        .fetch_all(pool)
        .await
    }
}
