//! Detected-face entity and insertion DTO.

use serde::Serialize;
use sqlx::FromRow;

use facia_core::geometry::BoundingBox;
use facia_core::types::{DbId, Timestamp};

/// A row from the `detected_faces` table.
///
/// The bounding box is stored as four scalar columns and is never mutated
/// after insert. `person_id` and `remote_template_id` change together: a
/// face registered with the external service always has an owning person.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DetectedFace {
    pub id: DbId,
    pub photo_id: DbId,
    pub person_id: Option<DbId>,
    pub remote_template_id: Option<String>,
    pub confidence: Option<f64>,
    pub box_left: f64,
    pub box_top: f64,
    pub box_width: f64,
    pub box_height: f64,
    pub quality_score: f64,
    pub review_status: String,
    pub is_confirmed: bool,
    pub detection_method: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl DetectedFace {
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::new(self.box_left, self.box_top, self.box_width, self.box_height)
    }
}

/// DTO for inserting one face from a detection pass.
#[derive(Debug, Clone)]
pub struct NewDetectedFace {
    pub bounding_box: BoundingBox,
    pub quality_score: f64,
}
