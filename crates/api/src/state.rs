use std::sync::Arc;

use arstudio_core::storage::MediaStorage;

use crate::background::marker_worker::MarkerQueue;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: arstudio_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Media root that uploads and publish artifacts are written to.
    pub storage: MediaStorage,
    /// Sender side of the marker generation worker.
    pub marker_queue: MarkerQueue,
}
