//! Recognition pass: similarity search plus geometric binding.
//!
//! The search result carries similarity scores but no reliable face
//! correspondence in multi-face images, so each match is bound back to a
//! still-unassigned face by bounding-box overlap (see
//! [`facia_core::matching::bind_matches`]) before any row is touched.
//!
//! A pass that keeps failing leaves no terminal state behind: unmatched
//! faces simply stay unassigned, awaiting manual labeling.

use serde::Serialize;

use facia_core::error::CoreError;
use facia_core::geometry::BoundingBox;
use facia_core::matching::{bind_matches, classify_similarity, MatchTier};
use facia_core::status::{ProcessingStatus, ReviewStatus};
use facia_core::types::DbId;
use facia_db::models::Photo;
use facia_db::repositories::{EncodingRepo, FaceRepo, PhotoRepo};

use crate::error::EngineError;
use crate::Engine;

/// Result of one recognition pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecognitionOutcome {
    pub photo_id: DbId,
    /// Unassigned faces that were candidates for binding.
    pub candidates: usize,
    /// Matches returned by the external search.
    pub matches: usize,
    /// Faces auto-confirmed (similarity cleared the conservative threshold).
    pub confirmed: usize,
    /// Faces queued for human review.
    pub needs_review: usize,
    /// Matches discarded as unbindable (no region, sub-floor overlap, or no
    /// local shadow for the template).
    pub discarded: usize,
    /// False when the pass was abandoned after exhausting its retries.
    pub completed: bool,
    pub attempts: u32,
}

impl Engine {
    /// Run a recognition pass over a photo's unassigned faces.
    ///
    /// Precondition: detection has completed for the photo and found faces.
    /// A photo with no unassigned faces left is a successful no-op.
    pub async fn run_recognition(&self, photo_id: DbId) -> Result<RecognitionOutcome, EngineError> {
        let photo = PhotoRepo::find_by_id(&self.pool, photo_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Photo",
                id: photo_id,
            })?;

        let status = photo.status()?;
        if status != ProcessingStatus::Completed {
            return Err(CoreError::Validation(format!(
                "Photo {photo_id} is not ready for recognition (status: {})",
                status.as_str()
            ))
            .into());
        }
        if photo.face_count == 0 {
            return Err(CoreError::Validation(format!(
                "Photo {photo_id} has no detected faces to recognize"
            ))
            .into());
        }

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.recognition_attempt(&photo).await {
                Ok(mut outcome) => {
                    outcome.attempts = attempt;
                    tracing::info!(
                        photo_id,
                        candidates = outcome.candidates,
                        confirmed = outcome.confirmed,
                        needs_review = outcome.needs_review,
                        discarded = outcome.discarded,
                        "Recognition pass completed",
                    );
                    return Ok(outcome);
                }
                Err(e) if e.is_transient() && self.config.retry.allows_retry(attempt) => {
                    let delay = self.config.retry.jittered_delay_for(attempt);
                    tracing::warn!(
                        photo_id,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Recognition attempt failed; retrying",
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    // No terminal state: the faces stay unassigned and a
                    // later trigger can try again.
                    tracing::warn!(
                        photo_id,
                        attempts = attempt,
                        error = %e,
                        "Recognition pass abandoned; faces remain unassigned",
                    );
                    return Ok(RecognitionOutcome {
                        photo_id,
                        completed: false,
                        attempts: attempt,
                        ..Default::default()
                    });
                }
            }
        }
    }

    /// One full pass: search, resolve template owners, bind by overlap,
    /// write per-face updates.
    async fn recognition_attempt(&self, photo: &Photo) -> Result<RecognitionOutcome, EngineError> {
        let unassigned = FaceRepo::list_unassigned(&self.pool, photo.id).await?;
        let mut outcome = RecognitionOutcome {
            photo_id: photo.id,
            candidates: unassigned.len(),
            completed: true,
            ..Default::default()
        };
        if unassigned.is_empty() {
            return Ok(outcome);
        }

        let bytes = self.store.load(&photo.storage_key).await?;
        let matches = self
            .provider
            .search(
                &bytes,
                self.config.liberal_threshold,
                self.config.max_search_results,
            )
            .await?;
        outcome.matches = matches.len();

        // Resolve each matched template to its locally-known person. A match
        // whose template has no local shadow cannot yield an assignment; it
        // will show up in the drift audit as a remote-only template.
        let mut owners: Vec<Option<DbId>> = Vec::with_capacity(matches.len());
        let mut regions: Vec<Option<BoundingBox>> = Vec::with_capacity(matches.len());
        for template_match in &matches {
            let owner =
                EncodingRepo::find_person_by_template(&self.pool, &template_match.template_id)
                    .await?;
            if owner.is_none() {
                tracing::warn!(
                    photo_id = photo.id,
                    template_id = %template_match.template_id,
                    "Search match has no local encoding; skipping",
                );
            }
            // Region is only considered when the owner is known.
            regions.push(owner.and(template_match.region));
            owners.push(owner);
        }

        let face_boxes: Vec<BoundingBox> = unassigned.iter().map(|f| f.bounding_box()).collect();
        let bound = bind_matches(&regions, &face_boxes, self.config.overlap_floor);
        outcome.discarded = matches.len() - bound.len();

        for binding in bound {
            let template_match = &matches[binding.match_index];
            // Regions without a resolved owner were withheld from binding.
            let Some(person_id) = owners[binding.match_index] else {
                continue;
            };
            let face = &unassigned[binding.face_index];

            let Some(tier) = classify_similarity(
                template_match.similarity,
                self.config.liberal_threshold,
                self.config.conservative_threshold,
            ) else {
                // The service returned a match below the requested floor;
                // treat it as unbindable rather than guessing.
                outcome.discarded += 1;
                continue;
            };

            let review_status = match tier {
                MatchTier::Confirmed => ReviewStatus::Confirmed,
                MatchTier::Review => ReviewStatus::Review,
            };

            let applied = FaceRepo::apply_recognition(
                &self.pool,
                face.id,
                person_id,
                template_match.similarity,
                review_status,
            )
            .await?;

            if !applied {
                // The face was assigned concurrently; drop this result.
                tracing::debug!(
                    face_id = face.id,
                    "Face assigned concurrently; recognition result dropped",
                );
                outcome.discarded += 1;
                continue;
            }

            tracing::info!(
                photo_id = photo.id,
                face_id = face.id,
                person_id,
                similarity = template_match.similarity,
                overlap = binding.overlap,
                review_status = review_status.as_str(),
                "Face matched to person",
            );
            match tier {
                MatchTier::Confirmed => outcome.confirmed += 1,
                MatchTier::Review => outcome.needs_review += 1,
            }
        }

        Ok(outcome)
    }
}
