//! Photo entity: one row per uploaded image.

use serde::Serialize;
use sqlx::FromRow;

use facia_core::error::CoreError;
use facia_core::status::ProcessingStatus;
use facia_core::types::{DbId, Timestamp};

/// A row from the `photos` table.
///
/// `processing_status` is stored as text; use [`Photo::status`] for the
/// typed view.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Photo {
    pub id: DbId,
    pub storage_key: String,
    pub processing_status: String,
    pub face_count: i32,
    pub processing_attempts: i32,
    pub last_error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Photo {
    pub fn status(&self) -> Result<ProcessingStatus, CoreError> {
        ProcessingStatus::parse(&self.processing_status)
    }
}
