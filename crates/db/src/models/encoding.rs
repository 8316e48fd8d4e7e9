//! Face-encoding entity: the local shadow of one remote template.

use serde::Serialize;
use sqlx::FromRow;

use facia_core::types::{DbId, Timestamp};

/// A row from the `face_encodings` table.
///
/// For every row a matching template should exist in the remote collection
/// and vice versa; divergence is drift, detected by the audit and never
/// silently repaired.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FaceEncoding {
    pub id: DbId,
    pub person_id: DbId,
    pub remote_template_id: String,
    pub confidence: Option<f64>,
    pub source_image_ref: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
