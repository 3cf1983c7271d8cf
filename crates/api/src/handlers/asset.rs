//! Handlers for the `/assets` resource.

use arstudio_core::asset::AssetType;
use arstudio_core::error::CoreError;
use arstudio_core::storage::ASSETS_DIR;
use arstudio_core::types::DbId;
use arstudio_db::models::asset::{Asset, CreateAsset, UpdateAsset};
use arstudio_db::repositories::AssetRepo;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::discard_file;
use crate::state::AppState;
use crate::upload::{UploadForm, UploadedFile};

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Asset", id })
}

/// Store an uploaded asset file and measure it on disk.
async fn store(state: &AppState, file: &UploadedFile) -> AppResult<(String, i64)> {
    let path = state
        .storage
        .save_upload(ASSETS_DIR, &file.filename, &file.data)
        .await?;
    let size = state.storage.file_size(&path).await?;
    let size = i64::try_from(size)
        .map_err(|_| AppError::InternalError(format!("File too large to record: {size} bytes")))?;
    Ok((path, size))
}

/// POST /api/v1/assets
///
/// Multipart fields: `name`, `type`, `file`.
pub async fn create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Asset>)> {
    let mut form = UploadForm::read(multipart).await?;
    let name = form.require_text("name")?;
    let asset_type = AssetType::parse(&form.require_text("type")?)?;
    let file = form.require_file("file")?;

    let mut input = CreateAsset {
        name,
        file_path: String::new(),
        asset_type,
        size_bytes: 0,
    };
    input.validate()?;

    let (file_path, size_bytes) = store(&state, &file).await?;
    input.file_path = file_path;
    input.size_bytes = size_bytes;

    let asset = match AssetRepo::create(&state.pool, &input).await {
        Ok(asset) => asset,
        Err(e) => {
            discard_file(&state, &input.file_path).await;
            return Err(e.into());
        }
    };

    tracing::info!(
        asset_id = asset.id,
        asset_type = %asset.asset_type,
        size_bytes = asset.size_bytes,
        "Asset created"
    );
    Ok((StatusCode::CREATED, Json(asset)))
}

/// GET /api/v1/assets
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Asset>>> {
    let assets = AssetRepo::list(&state.pool).await?;
    Ok(Json(assets))
}

/// GET /api/v1/assets/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Asset>> {
    let asset = AssetRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(asset))
}

/// PUT /api/v1/assets/{id}
///
/// Multipart fields: `name?`, `type?`, `file?`. A new file replaces the old
/// one and the size is measured again.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<Json<Asset>> {
    let mut form = UploadForm::read(multipart).await?;
    let asset_type = form.text("type").as_deref().map(AssetType::parse).transpose()?;
    let file = form.take_file("file");

    let mut input = UpdateAsset {
        name: form.text("name"),
        asset_type,
        file_path: None,
        size_bytes: None,
    };
    input.validate()?;

    let existing = AssetRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    if let Some(file) = &file {
        let (file_path, size_bytes) = store(&state, file).await?;
        input.file_path = Some(file_path);
        input.size_bytes = Some(size_bytes);
    }

    let updated = match AssetRepo::update(&state.pool, id, &input).await {
        Ok(Some(asset)) => asset,
        Ok(None) => {
            if let Some(path) = &input.file_path {
                discard_file(&state, path).await;
            }
            return Err(not_found(id));
        }
        Err(e) => {
            if let Some(path) = &input.file_path {
                discard_file(&state, path).await;
            }
            return Err(e.into());
        }
    };

    if input.file_path.is_some() {
        discard_file(&state, &existing.file_path).await;
    }

    Ok(Json(updated))
}

/// DELETE /api/v1/assets/{id}
///
/// Bindings that place this asset are removed with it.
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let asset = AssetRepo::delete(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    discard_file(&state, &asset.file_path).await;
    Ok(StatusCode::NO_CONTENT)
}
