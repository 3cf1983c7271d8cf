//! Experience-asset binding model and DTOs.

use arstudio_core::experience_config::Transform;
use arstudio_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from `experience_assets`: one asset placed on one target.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ExperienceAsset {
    pub id: DbId,
    pub experience_id: DbId,
    pub asset_id: DbId,
    pub target_id: DbId,
    pub transform: Json<Transform>,
    pub autoplay: bool,
    #[serde(rename = "loop")]
    pub looped: bool,
    pub face_user: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a binding. Accepts the short `experience`/`asset`/`target`
/// keys used by the editor as well as the `_id` forms.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateExperienceAsset {
    #[serde(alias = "experience")]
    pub experience_id: DbId,
    #[serde(alias = "asset")]
    pub asset_id: DbId,
    #[serde(alias = "target")]
    pub target_id: DbId,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    pub autoplay: bool,
    #[serde(default, rename = "loop")]
    pub looped: bool,
    #[serde(default)]
    pub face_user: bool,
}

/// DTO for updating a binding. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateExperienceAsset {
    #[serde(alias = "asset")]
    pub asset_id: Option<DbId>,
    #[serde(alias = "target")]
    pub target_id: Option<DbId>,
    pub transform: Option<Transform>,
    pub autoplay: Option<bool>,
    #[serde(rename = "loop")]
    pub looped: Option<bool>,
    pub face_user: Option<bool>,
}

/// A binding joined with its asset and target, as needed by the viewer.
#[derive(Debug, Clone, FromRow)]
pub struct ViewerBinding {
    pub binding_id: DbId,
    pub target_id: DbId,
    pub target_name: String,
    pub marker_path: Option<String>,
    pub asset_name: String,
    pub asset_type: String,
    pub file_path: String,
    pub transform: Json<Transform>,
    pub autoplay: bool,
    pub looped: bool,
    pub face_user: bool,
}
