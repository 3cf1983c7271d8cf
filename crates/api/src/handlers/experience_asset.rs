//! Handlers for the `/exp-assets` resource (asset placements).

use arstudio_core::error::CoreError;
use arstudio_core::types::DbId;
use arstudio_db::models::experience_asset::{
    CreateExperienceAsset, ExperienceAsset, UpdateExperienceAsset,
};
use arstudio_db::repositories::ExperienceAssetRepo;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::query::ExperienceFilter;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "ExperienceAsset",
        id,
    })
}

/// POST /api/v1/exp-assets
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateExperienceAsset>,
) -> AppResult<(StatusCode, Json<ExperienceAsset>)> {
    input.transform.validate()?;
    let binding = ExperienceAssetRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(binding)))
}

/// GET /api/v1/exp-assets
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ExperienceFilter>,
) -> AppResult<Json<Vec<ExperienceAsset>>> {
    let bindings = ExperienceAssetRepo::list(&state.pool, filter.experience_id).await?;
    Ok(Json(bindings))
}

/// GET /api/v1/exp-assets/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ExperienceAsset>> {
    let binding = ExperienceAssetRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(binding))
}

/// PUT /api/v1/exp-assets/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateExperienceAsset>,
) -> AppResult<Json<ExperienceAsset>> {
    if let Some(transform) = &input.transform {
        transform.validate()?;
    }
    let binding = ExperienceAssetRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(binding))
}

/// DELETE /api/v1/exp-assets/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if ExperienceAssetRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
