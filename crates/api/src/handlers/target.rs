//! Handlers for the `/targets` resource.
//!
//! Uploads are stored under `targets/` and marker generation is queued on the
//! background worker; responses never wait for the tool.

use arstudio_core::error::CoreError;
use arstudio_core::markers;
use arstudio_core::storage::TARGETS_DIR;
use arstudio_core::types::DbId;
use arstudio_db::models::target::{CreateTarget, Target, TargetMarker, UpdateTarget};
use arstudio_db::repositories::TargetRepo;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::discard_file;
use crate::query::ExperienceFilter;
use crate::state::AppState;
use crate::upload::{check_target_image, UploadForm};

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Target",
        id,
    })
}

/// POST /api/v1/targets
///
/// Multipart fields: `name`, `image`.
pub async fn create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Target>)> {
    let mut form = UploadForm::read(multipart).await?;
    let name = form.require_text("name")?;
    let image = form.require_file("image")?;
    check_target_image(&image)?;

    let mut input = CreateTarget {
        name,
        image_path: String::new(),
    };
    input.validate()?;

    input.image_path = state
        .storage
        .save_upload(TARGETS_DIR, &image.filename, &image.data)
        .await?;

    let target = match TargetRepo::create(&state.pool, &input).await {
        Ok(target) => target,
        Err(e) => {
            discard_file(&state, &input.image_path).await;
            return Err(e.into());
        }
    };

    state.marker_queue.enqueue(target.id, target.image_path.clone());
    tracing::info!(target_id = target.id, image = %target.image_path, "Target created");
    Ok((StatusCode::CREATED, Json(target)))
}

/// GET /api/v1/targets
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ExperienceFilter>,
) -> AppResult<Json<Vec<Target>>> {
    let targets = TargetRepo::list(&state.pool, filter.experience_id).await?;
    Ok(Json(targets))
}

/// GET /api/v1/targets/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Target>> {
    let target = TargetRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(target))
}

/// GET /api/v1/targets/{id}/marker
pub async fn marker_status(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<TargetMarker>> {
    let target = TargetRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(TargetMarker::from(&target)))
}

/// PUT /api/v1/targets/{id}
///
/// Multipart fields: `name?`, `image?`. A new image replaces the old one and
/// its descriptor, and queues regeneration.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<Json<Target>> {
    let mut form = UploadForm::read(multipart).await?;
    let image = form.take_file("image");
    if let Some(image) = &image {
        check_target_image(image)?;
    }

    let mut input = UpdateTarget {
        name: form.text("name"),
        image_path: None,
    };
    input.validate()?;

    let existing = TargetRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    if let Some(image) = &image {
        input.image_path = Some(
            state
                .storage
                .save_upload(TARGETS_DIR, &image.filename, &image.data)
                .await?,
        );
    }

    let updated = match TargetRepo::update(&state.pool, id, &input).await {
        Ok(Some(target)) => target,
        Ok(None) => {
            if let Some(path) = &input.image_path {
                discard_file(&state, path).await;
            }
            return Err(not_found(id));
        }
        Err(e) => {
            if let Some(path) = &input.image_path {
                discard_file(&state, path).await;
            }
            return Err(e.into());
        }
    };

    if input.image_path.is_some() {
        remove_target_files(&state, &existing).await;
        state
            .marker_queue
            .enqueue(updated.id, updated.image_path.clone());
        tracing::info!(target_id = id, image = %updated.image_path, "Target image replaced");
    }

    Ok(Json(updated))
}

/// DELETE /api/v1/targets/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let target = TargetRepo::delete(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    remove_target_files(&state, &target).await;
    Ok(StatusCode::NO_CONTENT)
}

/// Remove a target's image and any descriptor files next to it.
async fn remove_target_files(state: &AppState, target: &Target) {
    if let Ok(image) = state.storage.absolute(&target.image_path) {
        if let Err(e) = markers::remove_outputs(&image, state.config.marker_tool.variant).await {
            tracing::warn!(target_id = target.id, error = %e, "Failed to remove marker files");
        }
    }
    discard_file(state, &target.image_path).await;
}
