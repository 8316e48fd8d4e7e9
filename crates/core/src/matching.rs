//! Binding of similarity matches to detected faces, and confidence tiers.
//!
//! The external service's search results carry a similarity score and (at
//! best) the region the match was found in, but not which detected face the
//! match belongs to in a multi-face image. The correspondence is re-derived
//! here by bounding-box overlap. The tier constants decide whether a bound
//! match is auto-confirmed or queued for human review.

use crate::geometry::BoundingBox;

// ---------------------------------------------------------------------------
// Policy constants (defaults; overridable through engine configuration)
// ---------------------------------------------------------------------------

/// Lower similarity bound sent to the external search, tuned for recall.
pub const DEFAULT_LIBERAL_THRESHOLD: f64 = 60.0;

/// Similarity at or above which a bound match is auto-confirmed.
pub const DEFAULT_CONSERVATIVE_THRESHOLD: f64 = 75.0;

/// Minimum intersection-over-own-area ratio for a match region to bind to a
/// face. Below this the match is discarded rather than guessed.
pub const DEFAULT_OVERLAP_FLOOR: f64 = 0.5;

// ---------------------------------------------------------------------------
// Confidence tiers
// ---------------------------------------------------------------------------

/// Outcome tier for a similarity score that bound to a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    /// Similarity cleared the conservative threshold; no human review needed.
    Confirmed,
    /// Similarity is between the liberal and conservative thresholds;
    /// queued for human confirmation.
    Review,
}

/// Classify a similarity score into a tier.
///
/// Returns `None` for scores below `liberal` -- the search should not have
/// returned them, but a misbehaving service must not produce assignments.
pub fn classify_similarity(similarity: f64, liberal: f64, conservative: f64) -> Option<MatchTier> {
    if similarity >= conservative {
        Some(MatchTier::Confirmed)
    } else if similarity >= liberal {
        Some(MatchTier::Review)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Geometric binding
// ---------------------------------------------------------------------------

/// A match region bound to one face, by index into the input slices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundMatch {
    pub match_index: usize,
    pub face_index: usize,
    /// Intersection-over-own-area of the match region against the face box.
    pub overlap: f64,
}

/// Bind match regions to face boxes by greatest overlap.
///
/// `regions[i]` is the reported region of match `i` (`None` when the service
/// gave no geometry -- such matches never bind). `faces[j]` is the bounding
/// box of unassigned face `j`.
///
/// Pairs are considered in descending overlap order; each match and each face
/// binds at most once, and a pair below `floor` never binds. The result is
/// ordered by descending overlap.
pub fn bind_matches(
    regions: &[Option<BoundingBox>],
    faces: &[BoundingBox],
    floor: f64,
) -> Vec<BoundMatch> {
    let mut candidates: Vec<BoundMatch> = Vec::new();
    for (match_index, region) in regions.iter().enumerate() {
        let Some(region) = region else { continue };
        for (face_index, face) in faces.iter().enumerate() {
            let overlap = region.overlap_of_self(face);
            if overlap >= floor {
                candidates.push(BoundMatch {
                    match_index,
                    face_index,
                    overlap,
                });
            }
        }
    }

    // Highest overlap first; ties broken by match order for determinism.
    candidates.sort_by(|a, b| {
        b.overlap
            .partial_cmp(&a.overlap)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.match_index.cmp(&b.match_index))
    });

    let mut used_matches = vec![false; regions.len()];
    let mut used_faces = vec![false; faces.len()];
    let mut bound = Vec::new();
    for candidate in candidates {
        if used_matches[candidate.match_index] || used_faces[candidate.face_index] {
            continue;
        }
        used_matches[candidate.match_index] = true;
        used_faces[candidate.face_index] = true;
        bound.push(candidate);
    }
    bound
}

// ---------------------------------------------------------------------------
// Quality score derivation
// ---------------------------------------------------------------------------

/// Derive a face quality score from the service's sharpness/brightness
/// signals, falling back to detection confidence when neither is reported.
///
/// All inputs and the result are percent floats in `[0, 100]`.
pub fn derive_quality_score(
    sharpness: Option<f64>,
    brightness: Option<f64>,
    confidence: f64,
) -> f64 {
    match (sharpness, brightness) {
        (Some(s), Some(b)) => (s + b) / 2.0,
        (Some(s), None) => s,
        (None, Some(b)) => b,
        (None, None) => confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(left: f64, top: f64, width: f64, height: f64) -> BoundingBox {
        BoundingBox::new(left, top, width, height)
    }

    #[test]
    fn classify_at_tier_boundaries() {
        let l = DEFAULT_LIBERAL_THRESHOLD;
        let c = DEFAULT_CONSERVATIVE_THRESHOLD;
        assert_eq!(classify_similarity(75.0, l, c), Some(MatchTier::Confirmed));
        assert_eq!(classify_similarity(74.9, l, c), Some(MatchTier::Review));
        assert_eq!(classify_similarity(60.0, l, c), Some(MatchTier::Review));
        assert_eq!(classify_similarity(59.9, l, c), None);
        assert_eq!(classify_similarity(100.0, l, c), Some(MatchTier::Confirmed));
    }

    #[test]
    fn match_binds_to_face_with_highest_overlap() {
        // Face A at the top-left, face B at the bottom-right; the match
        // region overlaps A at ~0.9 of its own area and B not at all.
        let faces = vec![boxed(0.0, 0.0, 0.3, 0.3), boxed(0.6, 0.6, 0.3, 0.3)];
        let regions = vec![Some(boxed(0.03, 0.0, 0.3, 0.3))];

        let bound = bind_matches(&regions, &faces, DEFAULT_OVERLAP_FLOOR);
        assert_eq!(bound.len(), 1);
        assert_eq!(bound[0].face_index, 0);
        assert!(bound[0].overlap > 0.85);
    }

    #[test]
    fn match_below_floor_is_discarded() {
        let faces = vec![boxed(0.0, 0.0, 0.3, 0.3)];
        // Only 40% of the region lies over the face: below the 0.5 floor.
        let regions = vec![Some(boxed(0.18, 0.0, 0.3, 0.3))];

        let bound = bind_matches(&regions, &faces, DEFAULT_OVERLAP_FLOOR);
        assert!(bound.is_empty());
    }

    #[test]
    fn two_matches_never_bind_to_the_same_face() {
        let faces = vec![boxed(0.0, 0.0, 0.3, 0.3)];
        let regions = vec![
            Some(boxed(0.0, 0.0, 0.3, 0.3)),
            Some(boxed(0.05, 0.0, 0.3, 0.3)),
        ];

        let bound = bind_matches(&regions, &faces, DEFAULT_OVERLAP_FLOOR);
        assert_eq!(bound.len(), 1);
        // The exact-overlap match wins the only face.
        assert_eq!(bound[0].match_index, 0);
    }

    #[test]
    fn each_match_binds_its_own_face() {
        let faces = vec![boxed(0.0, 0.0, 0.3, 0.3), boxed(0.6, 0.6, 0.3, 0.3)];
        let regions = vec![
            Some(boxed(0.61, 0.6, 0.3, 0.3)),
            Some(boxed(0.01, 0.0, 0.3, 0.3)),
        ];

        let mut bound = bind_matches(&regions, &faces, DEFAULT_OVERLAP_FLOOR);
        bound.sort_by_key(|b| b.match_index);
        assert_eq!(bound.len(), 2);
        assert_eq!(bound[0].face_index, 1);
        assert_eq!(bound[1].face_index, 0);
    }

    #[test]
    fn match_without_region_never_binds() {
        let faces = vec![boxed(0.0, 0.0, 0.3, 0.3)];
        let regions: Vec<Option<BoundingBox>> = vec![None];
        assert!(bind_matches(&regions, &faces, DEFAULT_OVERLAP_FLOOR).is_empty());
    }

    #[test]
    fn quality_score_prefers_hints_over_confidence() {
        assert_eq!(derive_quality_score(Some(80.0), Some(60.0), 99.0), 70.0);
        assert_eq!(derive_quality_score(Some(80.0), None, 99.0), 80.0);
        assert_eq!(derive_quality_score(None, Some(60.0), 99.0), 60.0);
        assert_eq!(derive_quality_score(None, None, 99.0), 99.0);
    }
}
