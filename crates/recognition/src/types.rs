//! Wire types for the recognition service, one struct per operation result.
//!
//! Boxes are image-relative `[0, 1]` floats; similarity and confidence are
//! percent floats in `[0, 100]`, matching the rest of the system.

use serde::{Deserialize, Serialize};

use facia_core::error::CoreError;
use facia_core::geometry::BoundingBox;

/// Sharpness/brightness signals reported by detection, when available.
/// Used to derive a face quality score; absent fields fall back to the
/// detection confidence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QualityHints {
    pub sharpness: Option<f64>,
    pub brightness: Option<f64>,
}

/// One face located by `detect`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteFace {
    pub bounding_box: BoundingBox,
    /// Detection confidence in `[0, 100]`.
    pub confidence: f64,
    pub quality: Option<QualityHints>,
}

/// One identity template returned by `search`.
///
/// `region` is the area of the query image the match refers to. The service
/// does not reliably report it for every match; binding a region-less match
/// to a face is impossible and the engine discards it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateMatch {
    pub template_id: String,
    /// Similarity to the stored template in `[0, 100]`.
    pub similarity: f64,
    pub region: Option<BoundingBox>,
}

/// Result of `index`: the newly stored template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedTemplate {
    pub template_id: String,
    /// Where the indexed face was found in the submitted image, if reported.
    pub bounding_box: Option<BoundingBox>,
}

impl RemoteFace {
    /// Boundary validation: box inside the unit square, confidence in range.
    pub fn validate(&self) -> Result<(), CoreError> {
        self.bounding_box.validate()?;
        validate_percent("confidence", self.confidence)
    }
}

impl TemplateMatch {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.template_id.is_empty() {
            return Err(CoreError::Validation(
                "Search match carries an empty template id".into(),
            ));
        }
        validate_percent("similarity", self.similarity)?;
        if let Some(region) = &self.region {
            region.validate()?;
        }
        Ok(())
    }
}

fn validate_percent(field: &str, value: f64) -> Result<(), CoreError> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "{field} must be in [0, 100], got {value}"
        )))
    }
}
