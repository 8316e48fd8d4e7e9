//! The narrow interface the engine consumes.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::types::{IndexedTemplate, RemoteFace, TemplateMatch};

/// Abstraction over the external face-recognition service.
///
/// The template collection is part of the implementation's configuration,
/// not a per-call argument: one provider instance serves one collection.
/// Calls fail independently of the local store; no atomicity is assumed
/// across this boundary.
#[async_trait]
pub trait RecognitionProvider: Send + Sync {
    /// Locate faces in an image.
    async fn detect(&self, image: &[u8]) -> Result<Vec<RemoteFace>, ProviderError>;

    /// Search the collection for templates similar to faces in the image.
    ///
    /// `min_similarity` is the liberal threshold in `[0, 100]`; results
    /// below it are not returned.
    async fn search(
        &self,
        image: &[u8],
        min_similarity: f64,
        max_results: u32,
    ) -> Result<Vec<TemplateMatch>, ProviderError>;

    /// Register at most one new template from the image under `external_id`.
    async fn index_face(
        &self,
        image: &[u8],
        external_id: &str,
    ) -> Result<IndexedTemplate, ProviderError>;

    /// Delete templates from the collection, returning the ids actually
    /// deleted (ids unknown to the service are silently absent).
    async fn delete_templates(&self, template_ids: &[String]) -> Result<Vec<String>, ProviderError>;

    /// List every template id currently in the collection.
    async fn list_templates(&self) -> Result<Vec<String>, ProviderError>;
}
