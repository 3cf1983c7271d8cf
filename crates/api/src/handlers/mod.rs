//! HTTP handlers, one module per resource.

pub mod asset;
pub mod dashboard;
pub mod experience;
pub mod experience_asset;
pub mod metrics;
pub mod target;
pub mod viewer;

use crate::state::AppState;

/// Best-effort removal of a stored media file.
pub(crate) async fn discard_file(state: &AppState, relative: &str) {
    if let Err(e) = state.storage.remove(relative).await {
        tracing::warn!(path = %relative, error = %e, "Failed to remove stored file");
    }
}
