//! Handlers for the `/experiences` resource, including configuration and
//! publishing.

use arstudio_core::error::CoreError;
use arstudio_core::experience_config::{parse_config, MarkerType};
use arstudio_core::publish::{qr_filename, viewer_filename, PublishResult};
use arstudio_core::types::DbId;
use arstudio_db::models::experience::{CreateExperience, Experience, UpdateExperience};
use arstudio_db::repositories::ExperienceRepo;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::discard_file;
use crate::publishing::publish_experience;
use crate::response::{DataResponse, StatusResponse};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Experience",
        id,
    })
}

/// POST /api/v1/experiences
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateExperience>,
) -> AppResult<(StatusCode, Json<Experience>)> {
    input.validate()?;
    let experience = ExperienceRepo::create(&state.pool, &input).await?;
    tracing::info!(experience_id = experience.id, slug = %experience.slug, "Experience created");
    Ok((StatusCode::CREATED, Json(experience)))
}

/// GET /api/v1/experiences
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Experience>>> {
    let experiences = ExperienceRepo::list(&state.pool).await?;
    Ok(Json(experiences))
}

/// GET /api/v1/experiences/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Experience>> {
    let experience = ExperienceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(experience))
}

/// PUT /api/v1/experiences/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateExperience>,
) -> AppResult<Json<Experience>> {
    input.validate()?;
    let experience = ExperienceRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(experience))
}

/// DELETE /api/v1/experiences/{id}
///
/// Also removes the published snapshot and QR code, if any.
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if !ExperienceRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    discard_file(&state, &viewer_filename(id)).await;
    discard_file(&state, &qr_filename(id)).await;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/experiences/{id}/config
///
/// Body: `{ "config_json": { ... } }`. The whole configuration is replaced;
/// omitted keys take their defaults and unknown keys are rejected.
pub async fn save_config(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<serde_json::Value>,
) -> AppResult<Json<StatusResponse>> {
    let raw = body
        .get("config_json")
        .cloned()
        .unwrap_or_else(|| serde_json::json!({}));
    let config = parse_config(raw)?;

    ExperienceRepo::save_config(&state.pool, id, &config)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(StatusResponse {
        status: "config saved",
    }))
}

/// Optional body of the publish action.
#[derive(Debug, Default, Deserialize)]
pub struct PublishRequest {
    #[serde(default)]
    pub marker_type: Option<MarkerType>,
}

/// POST /api/v1/experiences/{id}/publish
///
/// Body is optional. Without a `marker_type` the viewer uses the mode that
/// matches the configured marker tool, so descriptors can be tracked.
pub async fn publish(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Bytes,
) -> AppResult<Json<DataResponse<PublishResult>>> {
    let request: PublishRequest = if body.iter().all(u8::is_ascii_whitespace) {
        PublishRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid publish request: {e}")))?
    };

    let tool_mode = state.config.marker_tool.variant.marker_type();
    let marker_type = match request.marker_type {
        Some(requested) if requested != tool_mode => {
            tracing::warn!(
                experience_id = id,
                requested = requested.as_str(),
                generated = tool_mode.as_str(),
                "Publishing with a marker type the marker tool does not produce"
            );
            requested
        }
        Some(requested) => requested,
        None => tool_mode,
    };

    let result = publish_experience(&state, id, marker_type).await?;
    Ok(Json(DataResponse { data: result }))
}
