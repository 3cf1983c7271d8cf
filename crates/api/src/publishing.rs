//! Publish orchestration and viewer scene assembly.

use arstudio_core::asset::AssetType;
use arstudio_core::error::CoreError;
use arstudio_core::experience_config::MarkerType;
use arstudio_core::publish::{
    check_content_size, media_url, qr_filename, viewer_filename, PublishResult,
};
use arstudio_core::qr;
use arstudio_core::types::DbId;
use arstudio_core::viewer::{render_viewer, ViewerItem, ViewerScene, ViewerTarget};
use arstudio_db::models::experience::Experience;
use arstudio_db::models::experience_asset::ViewerBinding;
use arstudio_db::repositories::{ExperienceAssetRepo, ExperienceRepo};

use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Publish an experience and write its viewer snapshot and QR code.
///
/// Checks run before anything is mutated: the experience must exist, must not
/// be published yet, and its bound assets must fit the size limit. The flag
/// and marker type are then set by one conditional update. Artifact writes
/// happen after the flag flips and are not rolled back on failure.
pub async fn publish_experience(
    state: &AppState,
    id: DbId,
    marker_type: MarkerType,
) -> AppResult<PublishResult> {
    let experience = ExperienceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Experience",
            id,
        }))?;
    if experience.is_published {
        return Err(already_published());
    }

    let total_bytes = ExperienceRepo::total_bound_asset_bytes(&state.pool, id).await?;
    check_content_size(total_bytes)?;

    // A concurrent publish may have won between the check and here.
    let experience = ExperienceRepo::publish(&state.pool, id, marker_type)
        .await?
        .ok_or_else(already_published)?;

    let config = &state.config;
    let scene = load_viewer_scene(state, &experience).await?;
    state
        .storage
        .write_artifact(&viewer_filename(id), render_viewer(&scene).as_bytes())
        .await?;

    let result = PublishResult::new(id, &config.media_url, &config.public_base_url);
    let png = qr::render_png(&result.public_url)?;
    state.storage.write_artifact(&qr_filename(id), &png).await?;

    tracing::info!(
        experience_id = id,
        total_bytes,
        marker_type = marker_type.as_str(),
        public_url = %result.public_url,
        "Experience published"
    );
    Ok(result)
}

fn already_published() -> AppError {
    AppError::Core(CoreError::Conflict("Experience is already published".into()))
}

/// Collect everything the viewer needs for `experience`.
pub async fn load_viewer_scene(state: &AppState, experience: &Experience) -> AppResult<ViewerScene> {
    let bindings = ExperienceAssetRepo::list_viewer_bindings(&state.pool, experience.id).await?;
    build_scene(&state.config, experience, bindings)
}

/// Group bindings (already ordered by target) into viewer targets.
fn build_scene(
    config: &ServerConfig,
    experience: &Experience,
    bindings: Vec<ViewerBinding>,
) -> AppResult<ViewerScene> {
    let mut targets: Vec<ViewerTarget> = Vec::new();

    for binding in bindings {
        let asset_type = AssetType::parse(&binding.asset_type)
            .map_err(|e| AppError::InternalError(format!("Stored asset type: {e}")))?;
        let item = ViewerItem {
            binding_id: binding.binding_id,
            asset_name: binding.asset_name,
            asset_type,
            asset_url: media_url(&config.media_url, &binding.file_path),
            transform: binding.transform.0,
            autoplay: binding.autoplay,
            looped: binding.looped,
            face_user: binding.face_user,
        };

        match targets.last_mut() {
            Some(target) if target.target_id == binding.target_id => target.items.push(item),
            _ => targets.push(ViewerTarget {
                target_id: binding.target_id,
                name: binding.target_name,
                descriptor_url: binding
                    .marker_path
                    .as_deref()
                    .map(|path| media_url(&config.media_url, path)),
                items: vec![item],
            }),
        }
    }

    Ok(ViewerScene {
        experience_id: experience.id,
        name: experience.name.clone(),
        slug: experience.slug.clone(),
        marker_type: experience.config.marker_type,
        metrics_url: format!("{}/api/v1/metrics", config.public_base_url),
        targets,
    })
}
