//! Detection orchestrator: turn a stored photo into persisted face rows.
//!
//! Failure policy (per the error taxonomy): transient external failures are
//! retried with backoff up to the policy's attempt budget; everything else
//! ends the run immediately. A run that exhausts its attempts marks the
//! photo `failed` with the last error -- a terminal, user-visible state that
//! only a fresh trigger re-attempts. Detection failures are recorded on the
//! photo and do not propagate as errors past this boundary.

use serde::Serialize;

use facia_core::error::CoreError;
use facia_core::matching::derive_quality_score;
use facia_core::status::ProcessingStatus;
use facia_core::types::DbId;
use facia_db::models::face::NewDetectedFace;
use facia_db::models::Photo;
use facia_db::repositories::PhotoRepo;

use crate::error::EngineError;
use crate::Engine;

/// Result of one detection run, reported to the caller. The photo row is
/// the durable source of truth; this is a convenience summary.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionOutcome {
    pub photo_id: DbId,
    pub status: ProcessingStatus,
    pub face_count: usize,
    /// Detection attempts performed in this run (1..=max_attempts).
    pub attempts: u32,
    pub error: Option<String>,
}

impl Engine {
    /// Run detection for a photo. Idempotent re-trigger: a completed photo
    /// is re-detected, replacing only its unassigned faces.
    pub async fn run_detection(&self, photo_id: DbId) -> Result<DetectionOutcome, EngineError> {
        let photo = PhotoRepo::find_by_id(&self.pool, photo_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Photo",
                id: photo_id,
            })?;

        PhotoRepo::mark_processing(&self.pool, photo_id).await?;

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.detection_attempt(&photo).await {
                Ok(faces) => {
                    let inserted =
                        PhotoRepo::store_detection_results(&self.pool, photo_id, &faces, attempt as i32)
                            .await?;
                    tracing::info!(
                        photo_id,
                        face_count = inserted.len(),
                        attempts = attempt,
                        "Detection completed",
                    );
                    return Ok(DetectionOutcome {
                        photo_id,
                        status: ProcessingStatus::Completed,
                        face_count: inserted.len(),
                        attempts: attempt,
                        error: None,
                    });
                }
                Err(e) if e.is_transient() && self.config.retry.allows_retry(attempt) => {
                    let delay = self.config.retry.jittered_delay_for(attempt);
                    tracing::warn!(
                        photo_id,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Detection attempt failed; retrying",
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    let message = e.to_string();
                    PhotoRepo::mark_failed(&self.pool, photo_id, &message, attempt as i32).await?;
                    tracing::error!(
                        photo_id,
                        attempts = attempt,
                        error = %message,
                        "Detection failed terminally",
                    );
                    return Ok(DetectionOutcome {
                        photo_id,
                        status: ProcessingStatus::Failed,
                        face_count: 0,
                        attempts: attempt,
                        error: Some(message),
                    });
                }
            }
        }
    }

    /// One full attempt: read the image bytes (once per attempt), call the
    /// external detection, derive a quality score per face. Nothing is
    /// persisted here, so a failed attempt leaves no partial rows.
    async fn detection_attempt(&self, photo: &Photo) -> Result<Vec<NewDetectedFace>, EngineError> {
        let bytes = self.store.load(&photo.storage_key).await?;
        let remote_faces = self.provider.detect(&bytes).await?;

        Ok(remote_faces
            .into_iter()
            .map(|face| {
                let quality_score = derive_quality_score(
                    face.quality.and_then(|q| q.sharpness),
                    face.quality.and_then(|q| q.brightness),
                    face.confidence,
                );
                NewDetectedFace {
                    bounding_box: face.bounding_box,
                    quality_score,
                }
            })
            .collect())
    }
}
