//! Repository for photo rows and the detection-pass status machine.

use sqlx::{PgConnection, PgPool};

use facia_core::types::DbId;

use crate::models::face::NewDetectedFace;
use crate::models::{DetectedFace, Photo};

/// Column list for `photos` queries.
const PHOTO_COLUMNS: &str = "id, storage_key, processing_status, face_count, \
     processing_attempts, last_error, created_at, updated_at";

/// Column list for `detected_faces` queries (shared with `FaceRepo`).
pub(crate) const FACE_COLUMNS: &str =
    "id, photo_id, person_id, remote_template_id, confidence, \
     box_left, box_top, box_width, box_height, quality_score, \
     review_status, is_confirmed, detection_method, created_at, updated_at";

pub struct PhotoRepo;

impl PhotoRepo {
    /// Register a stored image as a new photo in `pending` state.
    pub async fn create(pool: &PgPool, storage_key: &str) -> Result<Photo, sqlx::Error> {
        let query =
            format!("INSERT INTO photos (storage_key) VALUES ($1) RETURNING {PHOTO_COLUMNS}");
        sqlx::query_as::<_, Photo>(&query)
            .bind(storage_key)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Photo>, sqlx::Error> {
        let query = format!("SELECT {PHOTO_COLUMNS} FROM photos WHERE id = $1");
        sqlx::query_as::<_, Photo>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Transaction-scoped lookup, used inside multi-step commits.
    pub async fn find_by_id_in(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Photo>, sqlx::Error> {
        let query = format!("SELECT {PHOTO_COLUMNS} FROM photos WHERE id = $1");
        sqlx::query_as::<_, Photo>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Move a photo into the `processing` state at the start of a detection run.
    pub async fn mark_processing(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE photos SET processing_status = 'processing' WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Persist the outcome of a successful detection attempt.
    ///
    /// Runs in one transaction:
    /// 1. Delete unassigned faces left by any previous pass (assigned faces
    ///    are user evidence and survive re-detection).
    /// 2. Insert one row per newly detected face.
    /// 3. Update the photo: total face count, `completed` status, cleared
    ///    error, and the number of attempts this run needed.
    ///
    /// No partial face rows can survive a failed attempt because nothing is
    /// written until the attempt has produced its full result set.
    pub async fn store_detection_results(
        pool: &PgPool,
        photo_id: DbId,
        faces: &[NewDetectedFace],
        attempts: i32,
    ) -> Result<Vec<DetectedFace>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM detected_faces WHERE photo_id = $1 AND person_id IS NULL")
            .bind(photo_id)
            .execute(&mut *tx)
            .await?;

        let mut inserted = Vec::with_capacity(faces.len());
        let insert_query = format!(
            "INSERT INTO detected_faces \
                (photo_id, box_left, box_top, box_width, box_height, quality_score) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {FACE_COLUMNS}"
        );
        for face in faces {
            let row = sqlx::query_as::<_, DetectedFace>(&insert_query)
                .bind(photo_id)
                .bind(face.bounding_box.left)
                .bind(face.bounding_box.top)
                .bind(face.bounding_box.width)
                .bind(face.bounding_box.height)
                .bind(face.quality_score)
                .fetch_one(&mut *tx)
                .await?;
            inserted.push(row);
        }

        sqlx::query(
            "UPDATE photos SET \
                face_count = (SELECT COUNT(*) FROM detected_faces WHERE photo_id = $1), \
                processing_status = 'completed', \
                last_error = NULL, \
                processing_attempts = processing_attempts + $2 \
             WHERE id = $1",
        )
        .bind(photo_id)
        .bind(attempts)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(inserted)
    }

    /// Record a terminal detection failure. The photo stays in `failed`
    /// until a fresh trigger re-runs detection.
    pub async fn mark_failed(
        pool: &PgPool,
        id: DbId,
        error: &str,
        attempts: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE photos SET \
                processing_status = 'failed', \
                last_error = $2, \
                processing_attempts = processing_attempts + $3 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(error)
        .bind(attempts)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Transaction-scoped photo deletion (faces are removed separately so
    /// the caller can report counts).
    pub async fn delete_in(conn: &mut PgConnection, id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM photos WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}
