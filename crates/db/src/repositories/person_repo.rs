//! Repository for person rows.

use sqlx::{PgConnection, PgPool};

use facia_core::types::DbId;

use crate::models::Person;

const PERSON_COLUMNS: &str = "id, name, created_at, updated_at";

pub struct PersonRepo;

impl PersonRepo {
    pub async fn create(pool: &PgPool, name: &str) -> Result<Person, sqlx::Error> {
        let query = format!("INSERT INTO persons (name) VALUES ($1) RETURNING {PERSON_COLUMNS}");
        sqlx::query_as::<_, Person>(&query)
            .bind(name)
            .fetch_one(pool)
            .await
    }

    /// Transaction-scoped creation, used by the atomic identity commit.
    pub async fn create_in(conn: &mut PgConnection, name: &str) -> Result<Person, sqlx::Error> {
        let query = format!("INSERT INTO persons (name) VALUES ($1) RETURNING {PERSON_COLUMNS}");
        sqlx::query_as::<_, Person>(&query)
            .bind(name)
            .fetch_one(conn)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Person>, sqlx::Error> {
        let query = format!("SELECT {PERSON_COLUMNS} FROM persons WHERE id = $1");
        sqlx::query_as::<_, Person>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id_in(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Person>, sqlx::Error> {
        let query = format!("SELECT {PERSON_COLUMNS} FROM persons WHERE id = $1");
        sqlx::query_as::<_, Person>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Person>, sqlx::Error> {
        let query = format!("SELECT {PERSON_COLUMNS} FROM persons ORDER BY name, id");
        sqlx::query_as::<_, Person>(&query).fetch_all(pool).await
    }

    pub async fn delete_in(conn: &mut PgConnection, id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM persons WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}
