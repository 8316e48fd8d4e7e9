use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: facia_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Orchestration engine (detection, recognition, commits, cleanup).
    pub engine: Arc<facia_engine::Engine>,
}
