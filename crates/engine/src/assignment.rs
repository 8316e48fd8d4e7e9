//! Atomic identity commit: create-or-reuse a person, assign a face, and
//! register a template with the external service as one logical operation.
//!
//! Dual-write policy: the local transaction wraps everything that can be
//! rolled back; the external `index` call sits strictly before the commit.
//! If indexing fails the transaction is dropped and no local trace remains.
//! If a local write fails *after* indexing succeeded, the commit still fails
//! as a whole and the remote template is orphaned -- harmless, and visible
//! to the drift audit. This asymmetry is deliberate and must stay explicit.

use serde::{Deserialize, Serialize};

use facia_core::error::CoreError;
use facia_core::types::DbId;
use facia_db::models::{DetectedFace, Person};
use facia_db::repositories::{EncodingRepo, FaceRepo, PersonRepo, PhotoRepo};
use facia_recognition::ProviderError;

use crate::crop::crop_face_region;
use crate::error::EngineError;
use crate::Engine;

/// Who a face is being assigned to.
#[derive(Debug, Clone, Deserialize)]
pub enum AssignmentTarget {
    /// Create a new person with this name. A name equal to an existing
    /// person's is allowed and creates a distinct identity; reuse goes
    /// through `Existing`.
    NewName(String),
    /// Assign to an existing person, adding another template for them.
    Existing(DbId),
}

/// Result of a successful commit.
#[derive(Debug, Clone, Serialize)]
pub struct CommittedAssignment {
    pub person: Person,
    pub face: DetectedFace,
}

impl Engine {
    /// Commit an identity assignment for one face.
    ///
    /// Fails with a conflict before any external call if the face already
    /// has a person. Concurrent commits on the same face are serialized by
    /// the `FOR UPDATE` row lock; a race that slips past still resolves at
    /// the row level, with the loser's template left for the drift audit.
    pub async fn commit_assignment(
        &self,
        face_id: DbId,
        target: AssignmentTarget,
    ) -> Result<CommittedAssignment, EngineError> {
        let mut tx = self.pool.begin().await?;

        let face = FaceRepo::lock_by_id(&mut *tx, face_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "DetectedFace",
                id: face_id,
            })?;

        if let Some(existing) = face.person_id {
            return Err(CoreError::Conflict(format!(
                "Face {face_id} is already assigned to person {existing}"
            ))
            .into());
        }

        let photo = PhotoRepo::find_by_id_in(&mut *tx, face.photo_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Photo",
                id: face.photo_id,
            })?;

        let person = match &target {
            AssignmentTarget::NewName(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(
                        CoreError::Validation("Person name must not be empty".into()).into()
                    );
                }
                PersonRepo::create_in(&mut *tx, name).await?
            }
            AssignmentTarget::Existing(person_id) => PersonRepo::find_by_id_in(&mut *tx, *person_id)
                .await?
                .ok_or(CoreError::NotFound {
                    entity: "Person",
                    id: *person_id,
                })?,
        };

        let face = FaceRepo::assign_in(&mut *tx, face_id, person.id).await?;

        // External registration: the one step that cannot be rolled back.
        // Dropping the transaction on failure erases the person/assignment
        // writes above, so no local record ever points at a template that
        // was never created.
        let bytes = self.store.load(&photo.storage_key).await?;
        let face_image = crop_face_region(&bytes, &face.bounding_box())?;
        let external_id = format!("person-{}", person.id);
        let indexed = self
            .provider
            .index_face(&face_image, &external_id)
            .await
            .map_err(|e| indexing_failed(face_id, e))?;

        let face = FaceRepo::set_template_in(&mut *tx, face_id, &indexed.template_id).await?;
        EncodingRepo::insert_in(
            &mut *tx,
            person.id,
            &indexed.template_id,
            face.confidence,
            Some(&photo.storage_key),
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            face_id,
            person_id = person.id,
            template_id = %indexed.template_id,
            "Identity assignment committed",
        );
        Ok(CommittedAssignment { person, face })
    }
}

/// Wrap an index failure with the face context, preserving the
/// transient/terminal classification for the caller.
fn indexing_failed(face_id: DbId, err: ProviderError) -> EngineError {
    tracing::error!(face_id, error = %err, "Face indexing failed; rolling back commit");
    let core = match CoreError::from(err) {
        CoreError::TransientExternal(msg) => {
            CoreError::TransientExternal(format!("Face indexing failed for face {face_id}: {msg}"))
        }
        CoreError::TerminalExternal(msg) => {
            CoreError::TerminalExternal(format!("Face indexing failed for face {face_id}: {msg}"))
        }
        other => other,
    };
    core.into()
}
