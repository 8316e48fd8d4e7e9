//! The identity reconciliation and face-assignment engine.
//!
//! Four components share one [`Engine`]:
//!
//! - [`detection`]: runs external detection and persists located faces
//!   atomically with the photo's status.
//! - [`recognition`]: runs external similarity search and binds matches back
//!   to detected faces by bounding-box overlap.
//! - [`assignment`]: the atomic identity commit (create-or-reuse person,
//!   assign face, register remote template) as one compensable operation.
//! - [`reconcile`]: reassignment, deletions, and the local/remote drift
//!   audit.
//!
//! The engine holds no in-memory state between calls; Postgres transactions
//! are the only coordination mechanism.

pub mod assignment;
pub mod config;
pub mod crop;
pub mod detection;
pub mod error;
pub mod reconcile;
pub mod recognition;
pub mod store;

use std::sync::Arc;

use facia_db::DbPool;
use facia_recognition::RecognitionProvider;

pub use config::EngineConfig;
pub use error::EngineError;
pub use store::{ImageStore, LocalImageStore, StoreError};

/// Shared handle for all engine operations.
///
/// Cheap to clone; per-request handlers hold one instance behind an `Arc`.
pub struct Engine {
    pub(crate) pool: DbPool,
    pub(crate) provider: Arc<dyn RecognitionProvider>,
    pub(crate) store: Arc<dyn ImageStore>,
    pub(crate) config: EngineConfig,
}

impl Engine {
    pub fn new(
        pool: DbPool,
        provider: Arc<dyn RecognitionProvider>,
        store: Arc<dyn ImageStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            pool,
            provider,
            store,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn ImageStore> {
        &self.store
    }
}
