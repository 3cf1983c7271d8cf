use arstudio_core::error::CoreError;
use arstudio_core::types::DbId;
use arstudio_core::viewer::render_viewer;
use arstudio_db::repositories::ExperienceRepo;
use axum::extract::{Path, State};
use axum::response::Html;

use crate::error::{AppError, AppResult};
use crate::publishing::load_viewer_scene;
use crate::state::AppState;

/// GET /viewer/{id}
///
/// Live viewer for a published experience. Each successful request counts as
/// one view; unpublished experiences are reported as not found.
pub async fn show(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<Html<String>> {
    let experience = ExperienceRepo::record_view(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Experience",
            id,
        }))?;

    let scene = load_viewer_scene(&state, &experience).await?;
    Ok(Html(render_viewer(&scene)))
}
