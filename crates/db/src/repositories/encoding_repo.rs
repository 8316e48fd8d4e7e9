//! Repository for face-encoding rows (local shadows of remote templates).

use sqlx::{PgConnection, PgPool};

use facia_core::types::DbId;

use crate::models::FaceEncoding;

const ENCODING_COLUMNS: &str =
    "id, person_id, remote_template_id, confidence, source_image_ref, created_at, updated_at";

pub struct EncodingRepo;

impl EncodingRepo {
    /// Transaction-scoped insert, paired with the face's template write in
    /// the atomic identity commit.
    pub async fn insert_in(
        conn: &mut PgConnection,
        person_id: DbId,
        remote_template_id: &str,
        confidence: Option<f64>,
        source_image_ref: Option<&str>,
    ) -> Result<FaceEncoding, sqlx::Error> {
        let query = format!(
            "INSERT INTO face_encodings \
                (person_id, remote_template_id, confidence, source_image_ref) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {ENCODING_COLUMNS}"
        );
        sqlx::query_as::<_, FaceEncoding>(&query)
            .bind(person_id)
            .bind(remote_template_id)
            .bind(confidence)
            .bind(source_image_ref)
            .fetch_one(conn)
            .await
    }

    pub async fn list_by_person(
        pool: &PgPool,
        person_id: DbId,
    ) -> Result<Vec<FaceEncoding>, sqlx::Error> {
        let query = format!(
            "SELECT {ENCODING_COLUMNS} FROM face_encodings WHERE person_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, FaceEncoding>(&query)
            .bind(person_id)
            .fetch_all(pool)
            .await
    }

    /// Every template id the local store believes exists remotely.
    /// One side of the drift audit.
    pub async fn list_template_ids(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT remote_template_id FROM face_encodings ORDER BY remote_template_id",
        )
        .fetch_all(pool)
        .await
    }

    /// Resolve a matched template id to the person owning it.
    pub async fn find_person_by_template(
        pool: &PgPool,
        remote_template_id: &str,
    ) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT person_id FROM face_encodings WHERE remote_template_id = $1",
        )
        .bind(remote_template_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete_by_person_in(
        conn: &mut PgConnection,
        person_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM face_encodings WHERE person_id = $1")
            .bind(person_id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_by_template_id_in(
        conn: &mut PgConnection,
        remote_template_id: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM face_encodings WHERE remote_template_id = $1")
            .bind(remote_template_id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_by_template_ids_in(
        conn: &mut PgConnection,
        remote_template_ids: &[String],
    ) -> Result<u64, sqlx::Error> {
        if remote_template_ids.is_empty() {
            return Ok(0);
        }
        let result =
            sqlx::query("DELETE FROM face_encodings WHERE remote_template_id = ANY($1)")
                .bind(remote_template_ids)
                .execute(conn)
                .await?;
        Ok(result.rows_affected())
    }
}
