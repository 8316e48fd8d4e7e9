//! Bounding-box geometry for detected faces and search-match regions.
//!
//! All boxes are image-relative: `left`/`top`/`width`/`height` are fractions
//! of the image dimensions in `[0, 1]`, so geometry is independent of the
//! pixel size the external service saw.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// An axis-aligned, image-relative bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Right edge (left + width).
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge (top + height).
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Relative area (width x height).
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Area of the axis-aligned intersection with `other`.
    pub fn intersection_area(&self, other: &BoundingBox) -> f64 {
        let w = (self.right().min(other.right()) - self.left.max(other.left)).max(0.0);
        let h = (self.bottom().min(other.bottom()) - self.top.max(other.top)).max(0.0);
        w * h
    }

    /// Intersection over *own* area: what fraction of this box lies inside
    /// `other`. Asymmetric on purpose -- a small match region fully inside a
    /// large face box scores 1.0, not the IoU value.
    ///
    /// Degenerate (zero-area) boxes score 0.0.
    pub fn overlap_of_self(&self, other: &BoundingBox) -> f64 {
        let own = self.area();
        if own <= 0.0 {
            return 0.0;
        }
        self.intersection_area(other) / own
    }

    /// Reject boxes outside the relative `[0, 1]` coordinate space or with
    /// non-positive dimensions. Applied at the provider boundary.
    pub fn validate(&self) -> Result<(), CoreError> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !in_unit(self.left) || !in_unit(self.top) {
            return Err(CoreError::Validation(format!(
                "Bounding box origin out of range: left={}, top={}",
                self.left, self.top
            )));
        }
        if self.width <= 0.0 || self.height <= 0.0 || self.right() > 1.0 || self.bottom() > 1.0 {
            return Err(CoreError::Validation(format!(
                "Bounding box dimensions out of range: width={}, height={}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}
