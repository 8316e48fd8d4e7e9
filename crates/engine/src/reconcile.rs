//! Consistency and cleanup: reassignment, deletions, and the drift audit.
//!
//! Deletion paths tolerate remote failure (a stale template with no local
//! shadow is less harmful than a local record pointing at a nonexistent
//! template), while the commit path in [`crate::assignment`] fails hard.
//! The two policies stay in distinct helpers so the choice is visible at
//! every call site: [`Engine::try_delete_remote_templates`] is the
//! best-effort side.

use std::collections::BTreeSet;

use serde::Serialize;

use facia_core::error::CoreError;
use facia_core::types::DbId;
use facia_db::models::DetectedFace;
use facia_db::repositories::{EncodingRepo, FaceRepo, PersonRepo, PhotoRepo};

use crate::assignment::AssignmentTarget;
use crate::error::EngineError;
use crate::Engine;

/// Placeholder template ids (legacy imports) carry this prefix and have no
/// remote backing, so deletion never calls out for them.
const PLACEHOLDER_PREFIX: &str = "pending:";

/// Whether a stored template id refers to a real remote template.
pub fn is_backing_template(template_id: &str) -> bool {
    !template_id.starts_with(PLACEHOLDER_PREFIX)
}

/// Row counts from a person deletion.
#[derive(Debug, Clone, Serialize)]
pub struct PersonDeletionSummary {
    pub person_id: DbId,
    pub encodings_deleted: u64,
    pub faces_reverted: u64,
    pub remote_templates_deleted: usize,
}

/// Row counts from a photo deletion.
#[derive(Debug, Clone, Serialize)]
pub struct PhotoDeletionSummary {
    pub photo_id: DbId,
    pub faces_deleted: u64,
    pub encodings_deleted: u64,
    pub remote_templates_deleted: usize,
}

/// The symmetric difference between local encodings and the remote
/// collection. Reported for operator review; never auto-repaired.
#[derive(Debug, Clone, Serialize)]
pub struct DriftReport {
    /// Encodings with no remote counterpart (e.g. a template deleted
    /// remotely out of band).
    pub local_only: Vec<String>,
    /// Remote templates with no local shadow (e.g. orphans from commits
    /// that failed after indexing).
    pub remote_only: Vec<String>,
}

impl Engine {
    /// Move a face to a new person, or back to unassigned.
    ///
    /// The old backing template is deleted remotely *before* the local
    /// reference is cleared; remote failure is logged and local state still
    /// advances. Reassignment to a person re-runs the indexing step of the
    /// identity commit.
    pub async fn reassign(
        &self,
        face_id: DbId,
        new_person_id: Option<DbId>,
    ) -> Result<DetectedFace, EngineError> {
        let face = FaceRepo::find_by_id(&self.pool, face_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "DetectedFace",
                id: face_id,
            })?;

        // Validate the target before touching anything.
        if let Some(person_id) = new_person_id {
            PersonRepo::find_by_id(&self.pool, person_id)
                .await?
                .ok_or(CoreError::NotFound {
                    entity: "Person",
                    id: person_id,
                })?;
        }

        if let Some(template_id) = &face.remote_template_id {
            self.try_delete_remote_templates(std::slice::from_ref(template_id))
                .await;
        }

        let mut tx = self.pool.begin().await?;
        if let Some(template_id) = &face.remote_template_id {
            EncodingRepo::delete_by_template_id_in(&mut *tx, template_id).await?;
        }
        let face = FaceRepo::clear_assignment_in(&mut *tx, face_id).await?;
        tx.commit().await?;

        tracing::info!(face_id, new_person_id, "Face assignment cleared");

        match new_person_id {
            Some(person_id) => {
                let committed = self
                    .commit_assignment(face_id, AssignmentTarget::Existing(person_id))
                    .await?;
                Ok(committed.face)
            }
            None => Ok(face),
        }
    }

    /// Delete a person. Their faces revert to unassigned -- photo evidence
    /// is preserved, never cascaded away.
    pub async fn delete_person(
        &self,
        person_id: DbId,
    ) -> Result<PersonDeletionSummary, EngineError> {
        PersonRepo::find_by_id(&self.pool, person_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Person",
                id: person_id,
            })?;

        let encodings = EncodingRepo::list_by_person(&self.pool, person_id).await?;
        let template_ids: Vec<String> = encodings
            .iter()
            .map(|e| e.remote_template_id.clone())
            .collect();
        let remote_templates_deleted = self.try_delete_remote_templates(&template_ids).await;

        let mut tx = self.pool.begin().await?;
        let encodings_deleted = EncodingRepo::delete_by_person_in(&mut *tx, person_id).await?;
        let faces_reverted = FaceRepo::revert_by_person_in(&mut *tx, person_id).await?;
        PersonRepo::delete_in(&mut *tx, person_id).await?;
        tx.commit().await?;

        tracing::info!(
            person_id,
            encodings_deleted,
            faces_reverted,
            remote_templates_deleted,
            "Person deleted",
        );
        Ok(PersonDeletionSummary {
            person_id,
            encodings_deleted,
            faces_reverted,
            remote_templates_deleted,
        })
    }

    /// Delete a photo, its faces, and any encodings their templates back.
    /// The stored image is removed after the database commit, best-effort.
    pub async fn delete_photo(&self, photo_id: DbId) -> Result<PhotoDeletionSummary, EngineError> {
        let photo = PhotoRepo::find_by_id(&self.pool, photo_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Photo",
                id: photo_id,
            })?;

        let template_ids = FaceRepo::list_template_ids_by_photo(&self.pool, photo_id).await?;
        let remote_templates_deleted = self.try_delete_remote_templates(&template_ids).await;

        let mut tx = self.pool.begin().await?;
        let encodings_deleted =
            EncodingRepo::delete_by_template_ids_in(&mut *tx, &template_ids).await?;
        let faces_deleted = FaceRepo::delete_by_photo_in(&mut *tx, photo_id).await?;
        PhotoRepo::delete_in(&mut *tx, photo_id).await?;
        tx.commit().await?;

        if let Err(e) = self.store.delete(&photo.storage_key).await {
            tracing::warn!(
                photo_id,
                storage_key = %photo.storage_key,
                error = %e,
                "Stored image deletion failed; continuing",
            );
        }

        tracing::info!(
            photo_id,
            faces_deleted,
            encodings_deleted,
            remote_templates_deleted,
            "Photo deleted",
        );
        Ok(PhotoDeletionSummary {
            photo_id,
            faces_deleted,
            encodings_deleted,
            remote_templates_deleted,
        })
    }

    /// Compare local encodings against the remote collection and report the
    /// symmetric difference. Performs no mutation.
    pub async fn audit_drift(&self) -> Result<DriftReport, EngineError> {
        let remote: BTreeSet<String> = self
            .provider
            .list_templates()
            .await
            .map_err(CoreError::from)?
            .into_iter()
            .collect();
        let local: BTreeSet<String> = EncodingRepo::list_template_ids(&self.pool)
            .await?
            .into_iter()
            .filter(|id| is_backing_template(id))
            .collect();

        let report = DriftReport {
            local_only: local.difference(&remote).cloned().collect(),
            remote_only: remote.difference(&local).cloned().collect(),
        };
        if !report.local_only.is_empty() || !report.remote_only.is_empty() {
            tracing::warn!(
                local_only = report.local_only.len(),
                remote_only = report.remote_only.len(),
                "Template drift detected",
            );
        }
        Ok(report)
    }

    /// Best-effort remote template deletion. Placeholder ids are skipped,
    /// failures are logged, and local cleanup always proceeds. Returns the
    /// number of templates the service confirmed deleted.
    pub(crate) async fn try_delete_remote_templates(&self, template_ids: &[String]) -> usize {
        let backing: Vec<String> = template_ids
            .iter()
            .filter(|id| is_backing_template(id))
            .cloned()
            .collect();
        if backing.is_empty() {
            return 0;
        }

        match self.provider.delete_templates(&backing).await {
            Ok(deleted) => {
                if deleted.len() < backing.len() {
                    tracing::warn!(
                        requested = backing.len(),
                        deleted = deleted.len(),
                        "Some remote templates were already gone",
                    );
                }
                deleted.len()
            }
            Err(e) => {
                tracing::warn!(
                    count = backing.len(),
                    error = %e,
                    "Remote template deletion failed; continuing with local cleanup",
                );
                0
            }
        }
    }
}
