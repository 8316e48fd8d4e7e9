//! Person entity.

use serde::Serialize;
use sqlx::FromRow;

use facia_core::types::{DbId, Timestamp};

/// A row from the `persons` table. Created either directly by a user or
/// atomically alongside a first face assignment.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Person {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
